//! Frequency tables over the catalog.

use std::collections::BTreeMap;

use dramashelf_core::{FavoritesSet, Work};
use indexmap::{IndexMap, IndexSet};

/// Number of co-occurring tags kept per entity.
pub const TOP_TAGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub name: String,
    pub count: usize,
    pub top_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub tag_stats: Vec<StatEntry>,
    pub author_stats: Vec<StatEntry>,
    pub translator_stats: Vec<StatEntry>,
}

#[derive(Debug, Default)]
struct Tally {
    count: usize,
    tags: IndexMap<String, usize>,
}

#[derive(Debug, Default)]
struct Tallies {
    by_name: IndexMap<String, Tally>,
}

impl Tallies {
    fn record<'a>(&mut self, name: &str, tags: impl IntoIterator<Item = &'a str>) {
        let tally = self.by_name.entry(name.to_string()).or_default();
        tally.count += 1;
        for tag in tags {
            *tally.tags.entry(tag.to_string()).or_insert(0) += 1;
        }
    }

    fn into_entries(self) -> Vec<StatEntry> {
        let mut entries: Vec<StatEntry> = self
            .by_name
            .into_iter()
            .map(|(name, tally)| StatEntry {
                name,
                count: tally.count,
                top_tags: ranked(tally.tags)
                    .into_iter()
                    .take(TOP_TAGS)
                    .map(|(tag, _)| tag)
                    .collect(),
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

/// Count descending, first-seen order among equal counts.
fn ranked(counts: IndexMap<String, usize>) -> Vec<(String, usize)> {
    let mut out: Vec<_> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Drops repeats, keeping first-seen order.
pub(crate) fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> IndexSet<&'a str> {
    values.into_iter().collect()
}

/// Builds tag, author and translator tables in one pass over `works`.
///
/// Counts are per work: a tag listed twice on one work counts once, and a
/// translator field naming several people counts once for each of them.
pub fn aggregate<'a, I>(works: I) -> Stats
where
    I: IntoIterator<Item = &'a Work>,
{
    let mut tags = Tallies::default();
    let mut authors = Tallies::default();
    let mut translators = Tallies::default();

    for work in works {
        let work_tags = distinct(work.tags.iter().map(String::as_str));

        for tag in &work_tags {
            tags.record(tag, work_tags.iter().copied().filter(|other| other != tag));
        }
        authors.record(&work.author, work_tags.iter().copied());
        for name in distinct(work.translators()) {
            translators.record(name, work_tags.iter().copied());
        }
    }

    Stats {
        tag_stats: tags.into_entries(),
        author_stats: authors.into_entries(),
        translator_stats: translators.into_entries(),
    }
}

/// The first `n` entries of a table, e.g. for chart feeds.
pub fn top_entries(entries: &[StatEntry], n: usize) -> &[StatEntry] {
    &entries[..n.min(entries.len())]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub translated: usize,
    pub untranslated: usize,
    /// Favorites that still exist in the catalog.
    pub favorites: usize,
}

pub fn summary(works: &[Work], favorites: &FavoritesSet) -> Summary {
    let translated = works.iter().filter(|w| w.is_translated).count();
    Summary {
        total: works.len(),
        translated,
        untranslated: works.len() - translated,
        favorites: works.iter().filter(|w| favorites.contains(&w.id)).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

/// Works added per month, oldest first, limited to the latest `months`
/// months that have any additions. Works with unreadable dates are skipped.
pub fn monthly_counts(works: &[Work], months: usize) -> Vec<MonthCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for work in works {
        match work.added_on() {
            Some(date) => *counts.entry(date.format("%Y-%m").to_string()).or_insert(0) += 1,
            None => tracing::debug!(id = %work.id, date = %work.date_added, "skipping undated work"),
        }
    }

    let skip = counts.len().saturating_sub(months);
    counts
        .into_iter()
        .skip(skip)
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}
