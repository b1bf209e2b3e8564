use crate::filter::FilterState;
use hub_types::SortType;
use serde::Serialize;

/// Everything that determines a result page besides the index itself
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryState {
    /// Raw query text as typed
    pub query: String,
    pub sort: SortType,

    /// 1-based
    pub page: usize,
    pub filters: FilterState,
}

impl SearchQueryState {
    /// Empty query, first page, no filters
    #[must_use]
    pub fn new(default_sort: SortType) -> Self {
        Self {
            query: String::new(),
            sort: default_sort,
            page: 1,
            filters: FilterState::new(),
        }
    }

    /// Query text with surrounding whitespace removed
    #[must_use]
    pub fn trimmed_query(&self) -> &str {
        self.query.trim()
    }

    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.trimmed_query().is_empty()
    }

    /// Sort implied when no `sort` is given: Relevance while searching
    #[must_use]
    pub fn implicit_sort(&self, default_sort: SortType) -> SortType {
        if self.has_query() {
            SortType::Relevance
        } else {
            default_sort
        }
    }
}

impl Default for SearchQueryState {
    fn default() -> Self {
        Self::new(SortType::default())
    }
}
