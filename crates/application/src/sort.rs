use std::cmp::Ordering;

use dramashelf_core::{SortKey, Work};
use unicode_normalization::UnicodeNormalization as _;

/// Orders works by `key`. The sort is stable, so works with equal keys keep
/// the order they came in with.
pub fn sort<'a>(mut works: Vec<&'a Work>, key: SortKey) -> Vec<&'a Work> {
    match key {
        SortKey::DateDesc => works.sort_by(|a, b| b.added_on().cmp(&a.added_on())),
        SortKey::DateAsc => works.sort_by(|a, b| a.added_on().cmp(&b.added_on())),
        SortKey::NameAsc => works.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::NameDesc => works.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortKey::IdAsc => works.sort_by_key(|w| w.id),
        SortKey::IdDesc => works.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::Unsorted => {}
    }
    works
}

/// Title comparison that ignores case and compatibility forms (full-width
/// letters, ligatures), falling back to plain code point order.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    title.nfkc().flat_map(char::to_lowercase).collect()
}
