//! Application layer for Dramashelf: search parsing, filtering, ranking and
//! the per-session browse state.

use dramashelf_core::{FavoritesSet, PageSize, Settings, SortKey, StatusFilter, Work, WorkId};

pub mod filter;
pub mod page;
pub mod query;
pub mod related;
pub mod sort;
pub mod stats;
pub mod suggest;

pub use filter::{WorkFilter, filter};
pub use page::{Page, paginate};
pub use query::{ClauseKind, StructuredQuery, has_clause, parse, toggle_filter};
pub use related::{DEFAULT_RELATED_LIMIT, Related, related, score};
pub use sort::sort;
pub use stats::{MonthCount, StatEntry, Stats, Summary, aggregate, monthly_counts, summary, top_entries};
pub use suggest::{DEFAULT_SUGGESTION_LIMIT, Suggestion, SuggestionKind, suggest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status: StatusFilter,
    pub sort_key: SortKey,
    pub raw_query: String,
}

/// Why a query produced no rows, so a front end can word the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoFavorites,
    NoMatches,
}

#[derive(Debug, Clone)]
pub struct SessionView<'a> {
    pub page: Page<&'a Work>,
    pub total_matches: usize,
    pub empty_reason: Option<EmptyReason>,
}

impl SessionView<'_> {
    pub fn ids(&self) -> Vec<WorkId> {
        self.page.items.iter().map(|w| w.id).collect()
    }
}

/// Browse state for one session. Every change to the filter or sort order
/// sends the cursor back to page 1.
#[derive(Debug, Clone)]
pub struct FilterSession {
    state: FilterState,
    page_size: PageSize,
    current_page: usize,
}

impl Default for FilterSession {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl FilterSession {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: FilterState {
                sort_key: settings.default_sort,
                ..FilterState::default()
            },
            page_size: settings.items_per_page,
            current_page: 1,
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.set_status(status);
        self
    }

    pub fn with_query(mut self, raw: impl Into<String>) -> Self {
        self.set_query(raw);
        self
    }

    pub fn with_sort_key(mut self, key: SortKey) -> Self {
        self.set_sort_key(key);
        self
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.state.status = status;
        self.current_page = 1;
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.state.sort_key = key;
        self.current_page = 1;
    }

    pub fn set_query(&mut self, raw: impl Into<String>) {
        self.state.raw_query = raw.into();
        self.current_page = 1;
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.current_page = 1;
    }

    /// Requested page; `run` clamps it to the available range.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Adds or removes a clause in the search text, as clicking a tag,
    /// artist or translator chip does.
    pub fn toggle_clause(&mut self, kind: ClauseKind, value: &str) {
        let next = toggle_filter(&self.state.raw_query, kind, value);
        self.set_query(next);
    }

    pub fn clear(&mut self) {
        self.state.raw_query.clear();
        self.state.status = StatusFilter::All;
        self.current_page = 1;
    }

    /// Whether a favorites change alters what this session shows.
    pub fn refilter_needed_on_favorite_change(&self) -> bool {
        self.state.status == StatusFilter::Favorites
    }

    /// Every matching work in display order, ignoring pagination.
    pub fn matching<'a>(&self, works: &'a [Work], favorites: &FavoritesSet) -> Vec<&'a Work> {
        let query = parse(&self.state.raw_query);
        let matched = filter(works, self.state.status, &query, favorites);
        tracing::debug!(
            query = %query,
            status = %self.state.status,
            matched = matched.len(),
            "filtered catalog"
        );
        sort(matched, self.state.sort_key)
    }

    pub fn run<'a>(&mut self, works: &'a [Work], favorites: &FavoritesSet) -> SessionView<'a> {
        let ordered = self.matching(works, favorites);
        let page = paginate(&ordered, self.page_size, self.current_page);
        self.current_page = page.current_page;

        let empty_reason = match (ordered.is_empty(), self.state.status) {
            (false, _) => None,
            (true, StatusFilter::Favorites) => Some(EmptyReason::NoFavorites),
            (true, _) => Some(EmptyReason::NoMatches),
        };

        SessionView {
            total_matches: ordered.len(),
            page,
            empty_reason,
        }
    }
}
