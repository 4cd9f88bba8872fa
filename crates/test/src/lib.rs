//! Test helpers and fixtures.

use dramashelf_core::{Work, WorkId};

pub fn make_work(id: u32, title: &str, author: &str) -> Work {
    Work {
        id: WorkId(id),
        title: title.to_string(),
        author: author.to_string(),
        translator: String::new(),
        tags: Vec::new(),
        is_translated: false,
        original_url: format!("https://example.com/original/{id}"),
        translated_url: String::new(),
        description: String::new(),
        thumbnail: String::new(),
        date_added: "2024-01-01".to_string(),
    }
}

/// Builder-style tweaks for fixtures.
pub trait WorkExt {
    fn tags(self, tags: &[&str]) -> Self;
    fn translator(self, translator: &str) -> Self;
    fn translated(self, is_translated: bool) -> Self;
    fn added(self, date: &str) -> Self;
    fn description(self, description: &str) -> Self;
}

impl WorkExt for Work {
    fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    fn translator(mut self, translator: &str) -> Self {
        self.translator = translator.to_string();
        self
    }

    fn translated(mut self, is_translated: bool) -> Self {
        self.is_translated = is_translated;
        self
    }

    fn added(mut self, date: &str) -> Self {
        self.date_added = date.to_string();
        self
    }

    fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A small mixed catalog used across crates.
pub fn sample_catalog() -> Vec<Work> {
    vec![
        make_work(1, "死神与少年", "ささきの茶釜")
            .translator("就是很一般")
            .tags(&["小町", "圣白莲", "琪露诺"])
            .translated(true)
            .added("2023-06-18")
            .description("你是我活过的证明。"),
        make_work(2, "幻想死洛谭", "ささきの茶釜")
            .translator("就是很一般")
            .translated(true)
            .added("2024-08-24")
            .description("死而未绝，络续不绝之缘。"),
        make_work(3, "Moonlit Romance", "Nakano")
            .translator("甲、乙")
            .tags(&["Romance", "琪露诺"])
            .translated(true)
            .added("2025-08-17"),
        make_work(4, "Autumn Leaves", "Kaede")
            .tags(&["romance", "秋"])
            .added("2022-11-03")
            .description("A quiet story by nakano fans."),
        make_work(5, "Border of Life", "Nakano")
            .tags(&["小町"])
            .added("2024-08-24"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_works() {
        let work = make_work(12, "x", "y").tags(&["a"]).translated(true);
        assert_eq!(work.id, WorkId(12));
        assert_eq!(work.tags, vec!["a".to_string()]);
        assert!(work.is_translated);
    }

    #[test]
    fn sample_catalog_has_unique_ids() {
        let catalog = sample_catalog();
        let ids: std::collections::HashSet<_> = catalog.iter().map(|w| w.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }
}
