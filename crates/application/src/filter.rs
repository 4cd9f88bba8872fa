use dramashelf_core::{FavoritesSet, StatusFilter, Work};

use crate::query::StructuredQuery;

/// Status plus parsed query, evaluated against one work at a time.
#[derive(Debug, Clone, Copy)]
pub struct WorkFilter<'q> {
    pub status: StatusFilter,
    pub query: &'q StructuredQuery,
    pub favorites: &'q FavoritesSet,
}

impl<'q> WorkFilter<'q> {
    pub fn new(
        status: StatusFilter,
        query: &'q StructuredQuery,
        favorites: &'q FavoritesSet,
    ) -> Self {
        Self {
            status,
            query,
            favorites,
        }
    }

    pub fn matches(&self, work: &Work) -> bool {
        self.matches_status(work)
            && matches_tags(&self.query.tag_clauses, &work.tags)
            && matches_artists(&self.query.artist_clauses, &work.author)
            && matches_translators(&self.query.translator_clauses, work)
            && matches_fuzzy(&self.query.fuzzy_term, work)
    }

    fn matches_status(&self, work: &Work) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Translated => work.is_translated,
            StatusFilter::Untranslated => !work.is_translated,
            StatusFilter::Favorites => self.favorites.contains(&work.id),
        }
    }
}

/// Keeps the works that pass every predicate, in their incoming order.
pub fn filter<'a, I>(
    works: I,
    status: StatusFilter,
    query: &StructuredQuery,
    favorites: &FavoritesSet,
) -> Vec<&'a Work>
where
    I: IntoIterator<Item = &'a Work>,
{
    let filter = WorkFilter::new(status, query, favorites);
    works.into_iter().filter(|work| filter.matches(work)).collect()
}

fn matches_tags(clauses: &[String], tags: &[String]) -> bool {
    clauses
        .iter()
        .all(|clause| tags.iter().any(|tag| tag.to_lowercase() == *clause))
}

fn matches_artists(clauses: &[String], author: &str) -> bool {
    if clauses.is_empty() {
        return true;
    }
    let author = author.to_lowercase();
    clauses.iter().all(|clause| *clause == author)
}

fn matches_translators(clauses: &[String], work: &Work) -> bool {
    if clauses.is_empty() {
        return true;
    }
    let names: Vec<String> = work.translators().iter().map(|n| n.to_lowercase()).collect();
    clauses.iter().all(|clause| names.contains(clause))
}

fn matches_fuzzy(term: &str, work: &Work) -> bool {
    if term.is_empty() {
        return true;
    }
    let contains = |field: &str| field.to_lowercase().contains(term);
    contains(&work.title)
        || contains(&work.author)
        || work.translators().into_iter().any(|name| contains(name))
        || work.tags.iter().any(|tag| contains(tag))
        || contains(&work.description)
}
