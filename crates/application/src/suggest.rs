use std::collections::HashSet;

use dramashelf_core::Work;
use indexmap::IndexMap;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Title,
    Artist,
    Translator,
    Tag,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Title => "title",
            SuggestionKind::Artist => "artist",
            SuggestionKind::Translator => "translator",
            SuggestionKind::Tag => "tag",
        }
    }
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub value: String,
    /// Works carrying this value; always 1 for titles.
    pub count: usize,
}

/// Search-box completions: titles first, then artists, translators and tags
/// whose text contains `input`. A value is offered at most once.
pub fn suggest(works: &[Work], input: &str, limit: usize) -> Vec<Suggestion> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let hit = |text: &str| text.to_lowercase().contains(&needle);

    let mut titles: IndexMap<&str, usize> = IndexMap::new();
    let mut artists: IndexMap<&str, usize> = IndexMap::new();
    let mut translators: IndexMap<&str, usize> = IndexMap::new();
    let mut tags: IndexMap<&str, usize> = IndexMap::new();

    for work in works {
        if hit(&work.title) {
            titles.entry(&work.title).or_insert(1);
        }
        if hit(&work.author) {
            *artists.entry(&work.author).or_insert(0) += 1;
        }
        for name in work.translators() {
            if hit(name) {
                *translators.entry(name).or_insert(0) += 1;
            }
        }
        for tag in &work.tags {
            if hit(tag) {
                *tags.entry(tag).or_insert(0) += 1;
            }
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    let groups = [
        (SuggestionKind::Title, titles),
        (SuggestionKind::Artist, artists),
        (SuggestionKind::Translator, translators),
        (SuggestionKind::Tag, tags),
    ];
    for (kind, group) in groups {
        for (value, count) in group {
            if out.len() == limit {
                return out;
            }
            if seen.insert(value) {
                out.push(Suggestion {
                    kind,
                    value: value.to_string(),
                    count,
                });
            }
        }
    }
    out
}
