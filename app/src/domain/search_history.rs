//! Recently used job search terms.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{Analytics, Error};
use crate::domain::cache::CacheNamespace;
use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Key under [`CacheNamespace::SEARCH`] holding the term list.
pub const SEARCH_HISTORY_KEY: &str = "history";
/// Most terms kept.
pub const MAX_HISTORY_ITEMS: usize = 20;

/// Most-recent-first list of search terms persisted in the local store.
///
/// Entries are unique, trimmed, and never blank.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    analytics: Option<Analytics>,
    terms: Vec<String>,
}

impl SearchHistory {
    /// Create an empty history over `store`. Call [`Self::load`] to read
    /// previously saved terms.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            analytics: None,
            terms: Vec::new(),
        }
    }

    /// Report searches recorded through [`Self::record_search`].
    #[must_use]
    pub fn with_analytics(mut self, analytics: Analytics) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Terms, most recent first.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The `n` most recent terms.
    pub fn recent(&self, n: usize) -> &[String] {
        self.terms.get(..n).unwrap_or(&self.terms)
    }

    /// Read the saved list. A missing or unreadable list loads as empty.
    pub fn load(&mut self) -> Result<&[String], Error> {
        let raw = self
            .store
            .get(&Self::storage_key())
            .map_err(Self::map_store_error)?;
        self.terms = match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "discarding unreadable search history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(&self.terms)
    }

    /// Put `term` at the front, dropping any earlier copy.
    ///
    /// Blank terms are ignored.
    pub fn add_term(&mut self, term: &str) -> Result<(), Error> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }
        let mut updated = Vec::with_capacity(self.terms.len() + 1);
        updated.push(term.to_owned());
        updated.extend(self.terms.iter().filter(|item| *item != term).cloned());
        updated.truncate(MAX_HISTORY_ITEMS);
        self.save(updated)
    }

    /// Remember a search that produced `results_count` jobs.
    pub fn record_search(&mut self, term: &str, results_count: usize) -> Result<(), Error> {
        self.add_term(term)?;
        let query = term.trim();
        if let Some(analytics) = self.analytics.as_ref().filter(|_| !query.is_empty()) {
            analytics.track_search(query, results_count);
        }
        Ok(())
    }

    /// Drop `term` if present.
    pub fn remove_term(&mut self, term: &str) -> Result<(), Error> {
        let updated = self
            .terms
            .iter()
            .filter(|item| *item != term)
            .cloned()
            .collect();
        self.save(updated)
    }

    /// Forget every term.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.store
            .remove(&Self::storage_key())
            .map_err(Self::map_store_error)?;
        self.terms.clear();
        Ok(())
    }

    fn save(&mut self, terms: Vec<String>) -> Result<(), Error> {
        let encoded = serde_json::to_string(&terms)
            .map_err(|err| Error::internal(format!("failed to encode search history: {err}")))?;
        self.store
            .set(&Self::storage_key(), &encoded)
            .map_err(Self::map_store_error)?;
        self.terms = terms;
        Ok(())
    }

    fn storage_key() -> String {
        CacheNamespace::SEARCH.entry_key(SEARCH_HISTORY_KEY)
    }

    fn map_store_error(error: KeyValueStoreError) -> Error {
        Error::internal(format!("search history storage failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::MockKeyValueStore;
    use crate::outbound::storage::MemoryKeyValueStore;
    use crate::test_support::{MutableClock, RecordingAnalyticsSink};

    #[fixture]
    fn store() -> Arc<MemoryKeyValueStore> {
        Arc::new(MemoryKeyValueStore::default())
    }

    #[rstest]
    fn terms_are_trimmed_and_moved_to_the_front(store: Arc<MemoryKeyValueStore>) {
        let mut history = SearchHistory::new(store);
        for term in ["rust", " designer ", "rust", "   "] {
            history.add_term(term).expect("add");
        }
        assert_eq!(history.terms(), ["rust", "designer"]);
    }

    #[rstest]
    fn history_is_capped(store: Arc<MemoryKeyValueStore>) {
        let mut history = SearchHistory::new(store);
        for i in 0..25 {
            history.add_term(&format!("term {i}")).expect("add");
        }
        assert_eq!(history.terms().len(), MAX_HISTORY_ITEMS);
        assert_eq!(history.terms()[0], "term 24");
        assert_eq!(history.recent(3), ["term 24", "term 23", "term 22"]);
    }

    #[rstest]
    fn recent_returns_everything_when_asked_for_more(store: Arc<MemoryKeyValueStore>) {
        let mut history = SearchHistory::new(store);
        history.add_term("rust").expect("add");
        history.add_term("remote").expect("add");

        assert_eq!(history.recent(5), ["remote", "rust"]);
        assert!(SearchHistory::new(Arc::new(MemoryKeyValueStore::default()))
            .recent(3)
            .is_empty());
    }

    #[rstest]
    fn recorded_searches_are_reported(store: Arc<MemoryKeyValueStore>) {
        let sink = Arc::new(RecordingAnalyticsSink::default());
        let analytics = Analytics::new(sink.clone(), Arc::new(MutableClock::fixed()));
        let mut history = SearchHistory::new(store).with_analytics(analytics);

        history.record_search(" rust remote ", 7).expect("record");
        history.record_search("   ", 0).expect("blank");

        assert_eq!(history.terms(), ["rust remote"]);
        let events = sink.events();
        assert_eq!(sink.names(), ["app_start", "search"]);
        let search = events.last().expect("search event");
        assert_eq!(search.properties["search_query"], "rust remote");
        assert_eq!(search.properties["results_count"], 7);
    }

    #[rstest]
    fn saved_terms_survive_a_reload(store: Arc<MemoryKeyValueStore>) {
        let mut history = SearchHistory::new(store.clone());
        history.add_term("backend").expect("add");
        history.add_term("remote").expect("add");
        history.remove_term("backend").expect("remove");

        let mut reloaded = SearchHistory::new(store.clone());
        assert_eq!(reloaded.load().expect("load"), ["remote"]);
        assert_eq!(
            store.get("search:history").expect("read").as_deref(),
            Some(r#"["remote"]"#)
        );
    }

    #[rstest]
    fn clear_deletes_the_stored_list(store: Arc<MemoryKeyValueStore>) {
        let mut history = SearchHistory::new(store.clone());
        history.add_term("ops").expect("add");
        history.clear().expect("clear");

        assert!(history.terms().is_empty());
        assert_eq!(store.get("search:history").expect("read"), None);
    }

    #[rstest]
    fn unreadable_lists_load_empty(store: Arc<MemoryKeyValueStore>) {
        store.set("search:history", "{oops").expect("seed");
        let mut history = SearchHistory::new(store);
        assert!(history.load().expect("load").is_empty());
    }

    #[rstest]
    fn store_failures_leave_terms_unchanged() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .returning(|_, _| Err(KeyValueStoreError::io("disk full")));
        let mut history = SearchHistory::new(Arc::new(store));

        let err = history.add_term("rust").expect_err("write fails");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
        assert!(history.terms().is_empty());
    }
}
