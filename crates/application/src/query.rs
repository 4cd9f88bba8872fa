//! Structured search input: `tag="..."`, `artist="..."`, `translator="..."`
//! clauses mixed with free text.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_CLAUSE: Lazy<Regex> = Lazy::new(|| clause_regex("tag"));
static ARTIST_CLAUSE: Lazy<Regex> = Lazy::new(|| clause_regex("artist"));
static TRANSLATOR_CLAUSE: Lazy<Regex> = Lazy::new(|| clause_regex("translator"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

fn clause_regex(field: &str) -> Regex {
    Regex::new(&format!(r#"(?i){field}="([^"]+)""#)).expect("valid regex")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Tag,
    Artist,
    Translator,
}

impl ClauseKind {
    pub const ALL: [ClauseKind; 3] = [ClauseKind::Tag, ClauseKind::Artist, ClauseKind::Translator];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseKind::Tag => "tag",
            ClauseKind::Artist => "artist",
            ClauseKind::Translator => "translator",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            ClauseKind::Tag => &TAG_CLAUSE,
            ClauseKind::Artist => &ARTIST_CLAUSE,
            ClauseKind::Translator => &TRANSLATOR_CLAUSE,
        }
    }
}

impl std::fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClauseKind {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tag" => Ok(ClauseKind::Tag),
            "artist" => Ok(ClauseKind::Artist),
            "translator" => Ok(ClauseKind::Translator),
            _ => Err("unknown clause kind"),
        }
    }
}

/// Parsed search input. Clause values and the fuzzy term are lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredQuery {
    pub tag_clauses: Vec<String>,
    pub artist_clauses: Vec<String>,
    pub translator_clauses: Vec<String>,
    pub fuzzy_term: String,
}

impl StructuredQuery {
    pub fn is_empty(&self) -> bool {
        self.tag_clauses.is_empty()
            && self.artist_clauses.is_empty()
            && self.translator_clauses.is_empty()
            && self.fuzzy_term.is_empty()
    }

    pub fn clauses(&self, kind: ClauseKind) -> &[String] {
        match kind {
            ClauseKind::Tag => &self.tag_clauses,
            ClauseKind::Artist => &self.artist_clauses,
            ClauseKind::Translator => &self.translator_clauses,
        }
    }

    fn clauses_mut(&mut self, kind: ClauseKind) -> &mut Vec<String> {
        match kind {
            ClauseKind::Tag => &mut self.tag_clauses,
            ClauseKind::Artist => &mut self.artist_clauses,
            ClauseKind::Translator => &mut self.translator_clauses,
        }
    }
}

impl std::fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        for kind in ClauseKind::ALL {
            for value in self.clauses(kind) {
                parts.push(format!("{kind}=\"{value}\""));
            }
        }
        if !self.fuzzy_term.is_empty() {
            parts.push(self.fuzzy_term.clone());
        }
        f.write_str(&parts.join(" "))
    }
}

/// Parses raw search input. Never fails: text that is not a clause becomes
/// part of the fuzzy term.
pub fn parse(input: &str) -> StructuredQuery {
    let mut query = StructuredQuery::default();
    let mut rest = input.to_string();

    // Removing one clause can splice two fragments into a new clause, so keep
    // extracting until nothing matches.
    loop {
        let mut found = false;
        for kind in ClauseKind::ALL {
            let re = kind.regex();
            if !re.is_match(&rest) {
                continue;
            }
            found = true;
            let values = query.clauses_mut(kind);
            for caps in re.captures_iter(&rest) {
                values.push(caps[1].to_lowercase());
            }
            rest = re.replace_all(&rest, "").into_owned();
        }
        if !found {
            break;
        }
    }

    query.fuzzy_term = collapse_whitespace(&rest).to_lowercase();
    query
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Adds or removes a clause in raw search text.
///
/// Artist and translator clauses are exclusive: any existing clause of the
/// same kind is replaced. Tag clauses toggle, matching the value
/// case-insensitively.
pub fn toggle_filter(raw: &str, kind: ClauseKind, value: &str) -> String {
    let clause = format!("{kind}=\"{value}\"");
    match kind {
        ClauseKind::Artist | ClauseKind::Translator => {
            let stripped = collapse_whitespace(&kind.regex().replace_all(raw, ""));
            join_clause(&stripped, &clause)
        }
        ClauseKind::Tag => {
            let pattern = format!("(?i){}", regex::escape(&clause));
            let existing = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(err) => {
                    tracing::warn!("cannot build tag toggle pattern: {err}");
                    return join_clause(&collapse_whitespace(raw), &clause);
                }
            };
            if existing.is_match(raw) {
                collapse_whitespace(&existing.replace(raw, ""))
            } else {
                join_clause(&collapse_whitespace(raw), &clause)
            }
        }
    }
}

fn join_clause(text: &str, clause: &str) -> String {
    format!("{text} {clause}").trim().to_string()
}

/// Whether raw search text currently carries the given clause.
pub fn has_clause(raw: &str, kind: ClauseKind, value: &str) -> bool {
    let value = value.to_lowercase();
    parse(raw).clauses(kind).iter().any(|v| *v == value)
}
