//! Core domain types for Dramashelf.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkId(pub u32);

impl std::fmt::Display for WorkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for WorkId {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u32>()
            .map(WorkId)
            .map_err(|_| "work id must be a non-negative integer")
    }
}

/// Favorited work ids, kept ordered so the persisted array is stable.
pub type FavoritesSet = std::collections::BTreeSet<WorkId>;

/// Separators that may join several translator names in one field.
pub const TRANSLATOR_DELIMITERS: [char; 4] = [',', '、', '&', '和'];

/// Splits a raw translator field into individual names.
///
/// Segments are trimmed and empty segments dropped, so `"甲、 乙,"` yields
/// `["甲", "乙"]`. A name that itself contains a delimiter is split too.
pub fn split_translators(raw: &str) -> Vec<&str> {
    raw.split(TRANSLATOR_DELIMITERS)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: WorkId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub translator: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_translated: bool,
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub translated_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    pub date_added: String,
}

impl Work {
    pub fn translators(&self) -> Vec<&str> {
        split_translators(&self.translator)
    }

    /// Parsed `date_added`, or `None` when it is not a `YYYY-MM-DD` date.
    pub fn added_on(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(self.date_added.trim(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Translated,
    Untranslated,
    Favorites,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Translated => "translated",
            StatusFilter::Untranslated => "untranslated",
            StatusFilter::Favorites => "favorites",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "translated" => Ok(StatusFilter::Translated),
            "untranslated" => Ok(StatusFilter::Untranslated),
            "favorites" => Ok(StatusFilter::Favorites),
            _ => Err("unknown status filter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
    IdAsc,
    IdDesc,
    /// Keeps the filtered order untouched.
    Unsorted,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::IdAsc => "id-asc",
            SortKey::IdDesc => "id-desc",
            SortKey::Unsorted => "none",
        }
    }

    /// Like `parse`, but unknown names map to [`SortKey::Unsorted`].
    pub fn from_name(value: &str) -> Self {
        value.parse().unwrap_or(SortKey::Unsorted)
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date-desc" => Ok(SortKey::DateDesc),
            "date-asc" => Ok(SortKey::DateAsc),
            "name-asc" => Ok(SortKey::NameAsc),
            "name-desc" => Ok(SortKey::NameDesc),
            "id-asc" => Ok(SortKey::IdAsc),
            "id-desc" => Ok(SortKey::IdDesc),
            "none" => Ok(SortKey::Unsorted),
            _ => Err("unknown sort key"),
        }
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    All,
    Count(usize),
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageSize::All => f.write_str("all"),
            PageSize::Count(n) => write!(f, "{n}"),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        match value.parse::<usize>() {
            Ok(0) => Err("page size must be positive"),
            Ok(n) => Ok(PageSize::Count(n)),
            Err(_) => Err("page size must be \"all\" or a positive integer"),
        }
    }
}

impl Serialize for PageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Stored either as "all", "12" or 12.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(0) => Err(serde::de::Error::custom("page size must be positive")),
            Raw::Number(n) => usize::try_from(n)
                .map(PageSize::Count)
                .map_err(serde::de::Error::custom),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardLayout {
    #[default]
    Grid,
    List,
}

impl CardLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardLayout::Grid => "grid",
            CardLayout::List => "list",
        }
    }
}

impl std::fmt::Display for CardLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardLayout {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(CardLayout::Grid),
            "list" => Ok(CardLayout::List),
            _ => Err("unknown card layout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub card_layout: CardLayout,
    pub items_per_page: PageSize,
    pub default_sort: SortKey,
    pub enable_animations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            card_layout: CardLayout::Grid,
            items_per_page: PageSize::All,
            default_sort: SortKey::DateDesc,
            enable_animations: true,
        }
    }
}

impl Settings {
    /// Overlays every valid field of a stored settings object onto the
    /// defaults. Fields that are missing or have the wrong shape keep their
    /// default value.
    pub fn merged_from(stored: &serde_json::Map<String, serde_json::Value>) -> Self {
        fn field<T: serde::de::DeserializeOwned>(
            stored: &serde_json::Map<String, serde_json::Value>,
            key: &str,
        ) -> Option<T> {
            stored
                .get(key)
                .and_then(|value| serde_json::from_value(value.clone()).ok())
        }

        let mut settings = Settings::default();
        if let Some(layout) = field(stored, "cardLayout") {
            settings.card_layout = layout;
        }
        if let Some(per_page) = field(stored, "itemsPerPage") {
            settings.items_per_page = per_page;
        }
        if let Some(sort) = field(stored, "defaultSort") {
            settings.default_sort = sort;
        }
        if let Some(animations) = field(stored, "enableAnimations") {
            settings.enable_animations = animations;
        }
        settings.normalize();
        settings
    }

    pub fn normalize(&mut self) {
        if self.items_per_page == PageSize::Count(0) {
            self.items_per_page = PageSize::All;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn work_with_translator(translator: &str) -> Work {
        Work {
            id: WorkId(1),
            title: "t".to_string(),
            author: "a".to_string(),
            translator: translator.to_string(),
            tags: Vec::new(),
            is_translated: true,
            original_url: String::new(),
            translated_url: String::new(),
            description: String::new(),
            thumbnail: String::new(),
            date_added: "2024-01-02".to_string(),
        }
    }

    #[rstest]
    #[case("", &[])]
    #[case("甲", &["甲"])]
    #[case("甲、乙", &["甲", "乙"])]
    #[case("A, B & C", &["A", "B", "C"])]
    #[case("甲和 乙", &["甲", "乙"])]
    #[case(" ,、 ", &[])]
    fn splits_translator_names(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(split_translators(raw), expected);
    }

    #[test]
    fn work_exposes_translators_and_date() {
        let work = work_with_translator("甲、乙");
        assert_eq!(work.translators(), vec!["甲", "乙"]);
        assert_eq!(
            work.added_on(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        );

        let mut bad = work_with_translator("");
        bad.date_added = "someday".to_string();
        assert_eq!(bad.added_on(), None);
    }

    #[test]
    fn work_reads_camel_case_json() {
        let json = r#"{
            "id": 7,
            "title": "死神与少年",
            "author": "ささきの茶釜",
            "translator": "就是很一般",
            "tags": ["小町"],
            "isTranslated": true,
            "dateAdded": "2023-06-18"
        }"#;
        let work: Work = serde_json::from_str(json).unwrap();
        assert_eq!(work.id, WorkId(7));
        assert!(work.is_translated);
        assert_eq!(work.tags, vec!["小町".to_string()]);
        assert!(work.description.is_empty());
    }

    #[test]
    fn sort_key_parses_strings() {
        assert_eq!("date-desc".parse::<SortKey>().unwrap(), SortKey::DateDesc);
        assert_eq!(" ID-ASC ".parse::<SortKey>().unwrap(), SortKey::IdAsc);
        assert!("random".parse::<SortKey>().is_err());
        assert_eq!(SortKey::from_name("random"), SortKey::Unsorted);
    }

    #[test]
    fn status_filter_parses_strings() {
        assert_eq!(
            "Favorites".parse::<StatusFilter>().unwrap(),
            StatusFilter::Favorites
        );
        assert!("starred".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn page_size_parses_strings_and_numbers() {
        assert_eq!("all".parse::<PageSize>().unwrap(), PageSize::All);
        assert_eq!("12".parse::<PageSize>().unwrap(), PageSize::Count(12));
        assert!("0".parse::<PageSize>().is_err());
        assert!("many".parse::<PageSize>().is_err());

        let from_number: PageSize = serde_json::from_str("24").unwrap();
        assert_eq!(from_number, PageSize::Count(24));
        let from_text: PageSize = serde_json::from_str("\"48\"").unwrap();
        assert_eq!(from_text, PageSize::Count(48));
        assert_eq!(serde_json::to_string(&PageSize::All).unwrap(), "\"all\"");
    }

    #[test]
    fn settings_merge_keeps_valid_fields_only() {
        let stored = serde_json::json!({
            "cardLayout": "list",
            "itemsPerPage": "nope",
            "defaultSort": "name-asc",
            "enableAnimations": "yes"
        });
        let settings = Settings::merged_from(stored.as_object().unwrap());
        assert_eq!(settings.card_layout, CardLayout::List);
        assert_eq!(settings.items_per_page, PageSize::All);
        assert_eq!(settings.default_sort, SortKey::NameAsc);
        assert!(settings.enable_animations);
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let settings = Settings {
            items_per_page: PageSize::Count(12),
            ..Settings::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["itemsPerPage"], "12");
        assert_eq!(value["defaultSort"], "date-desc");
        assert_eq!(value["cardLayout"], "grid");
    }
}
