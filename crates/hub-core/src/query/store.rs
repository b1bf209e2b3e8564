use super::{QueryCodec, SearchQueryState};
use crate::filter::FilterKey;
use hub_types::SortType;
use tracing::debug;

/// Location sink updated after each mutation without adding a history entry
pub trait History {
    fn replace(&mut self, query_string: &str);
}

/// Handle returned by [`QueryStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SearchQueryState)>;

/// Owns the current `SearchQueryState` and keeps the location in sync with it.
///
/// Every mutation resets the page (except [`QueryStore::set_page`]), writes the
/// encoded state through [`History::replace`] and then notifies subscribers in
/// registration order.
pub struct QueryStore {
    state: SearchQueryState,
    codec: Box<dyn QueryCodec>,
    history: Option<Box<dyn History>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl QueryStore {
    /// Decode the initial state from the page's query string.
    ///
    /// The codec's default sort is the one the store falls back to.
    #[must_use]
    pub fn new(codec: Box<dyn QueryCodec>, initial: &str) -> Self {
        let state = codec.decode(initial);
        Self {
            state,
            codec,
            history: None,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: Box<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn state(&self) -> &SearchQueryState {
        &self.state
    }

    /// Current state as a query string
    #[must_use]
    pub fn encoded(&self) -> String {
        self.codec.encode(&self.state)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SearchQueryState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn set_query(&mut self, query: &str) {
        let had_query = self.state.has_query();
        query.clone_into(&mut self.state.query);
        let has_query = self.state.has_query();
        let default_sort = self.codec.default_sort();

        if !had_query && has_query && self.state.sort == default_sort {
            self.state.sort = SortType::Relevance;
        } else if had_query && !has_query && self.state.sort == SortType::Relevance {
            self.state.sort = default_sort;
        }
        self.commit(true);
    }

    /// Relevance is only accepted while a query is active
    pub fn set_sort(&mut self, sort: SortType) {
        if sort == SortType::Relevance && !self.state.has_query() {
            debug!("Relevance sort needs a query; keeping {}", self.state.sort);
            return;
        }
        self.state.sort = sort;
        self.commit(true);
    }

    pub fn set_filter(&mut self, key: FilterKey, option: &str, enabled: bool) {
        self.state.filters.set(key, option, enabled);
        self.commit(true);
    }

    pub fn toggle_filter(&mut self, key: FilterKey, option: &str) {
        self.state.filters.toggle(key, option);
        self.commit(true);
    }

    pub fn clear_dimension(&mut self, key: FilterKey) {
        self.state.filters.clear_dimension(key);
        self.commit(true);
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.commit(true);
    }

    /// Pages below 1 read as 1
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
        self.commit(false);
    }

    /// Back to an empty query with no filters
    pub fn reset(&mut self) {
        self.state = SearchQueryState::new(self.codec.default_sort());
        self.commit(true);
    }

    /// Back/forward navigation: adopt the location's state without writing it back
    pub fn on_navigate(&mut self, query_string: &str) {
        self.state = self.codec.decode(query_string);
        self.notify();
    }

    fn commit(&mut self, reset_page: bool) {
        if reset_page {
            self.state.page = 1;
        }
        if let Some(history) = self.history.as_mut() {
            history.replace(&self.codec.encode(&self.state));
        }
        self.notify();
    }

    fn notify(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}
