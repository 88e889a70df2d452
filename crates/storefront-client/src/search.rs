//! # Debounced Search
//!
//! Turns a stream of search-box edits into at most one backend search per
//! quiet period.
//!
//! ## Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  t=0     "p"     ──► ticket #1 scheduled for t=500                     │
//! │  t=100   "ph"    ──► #1 cancelled, #2 scheduled for t=600              │
//! │  t=200   "pho"   ──► #2 cancelled, #3 scheduled for t=700              │
//! │  t=300   "phon"  ──► #3 cancelled, #4 scheduled for t=800              │
//! │  t=800           ──► search_catalog("phon")                            │
//! │                                                                         │
//! │  Responses are tagged with their ticket's sequence number. A response  │
//! │  whose number is no longer the latest issued is dropped, so a slow     │
//! │  answer can never overwrite a newer one.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Outcomes are published on a `watch` channel; subscribers always see the
//! most recent [`SearchState`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use storefront_core::validation::{validate_search_query, MAX_SEARCH_QUERY_LEN};
use storefront_core::Product;
use tokio::sync::{oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::StorefrontBackend;
use crate::config::ClientConfig;

/// Default quiet period before a search is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

// =============================================================================
// Search State
// =============================================================================

/// The latest search outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No search has completed yet.
    #[default]
    Idle,

    Results {
        seq: u64,
        query: String,
        products: Vec<Product>,
    },

    /// The backend call failed. Not retried; the next edit starts over.
    Failed {
        seq: u64,
        query: String,
        message: String,
    },
}

impl SearchState {
    pub fn seq(&self) -> Option<u64> {
        match self {
            SearchState::Idle => None,
            SearchState::Results { seq, .. } | SearchState::Failed { seq, .. } => Some(*seq),
        }
    }
}

// =============================================================================
// Search Ticket
// =============================================================================

/// Handle to a scheduled, not-yet-sent search.
///
/// Cancelling consumes the ticket. Dropping it cancels as well.
#[derive(Debug)]
pub struct SearchTicket {
    seq: u64,
    cancel: oneshot::Sender<()>,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// True until the search is sent or cancelled.
    pub fn is_pending(&self) -> bool {
        !self.cancel.is_closed()
    }

    /// Cancels the search if it has not been sent yet. A search already in
    /// flight is left alone.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Debounces search-box input into backend searches.
///
/// Must be driven from inside a Tokio runtime: each edit spawns the task
/// that waits out the quiet period.
pub struct SearchDispatcher {
    backend: Arc<dyn StorefrontBackend>,
    delay: Duration,
    max_query_len: usize,
    pending: Option<SearchTicket>,
    last_issued: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl SearchDispatcher {
    pub fn new(backend: Arc<dyn StorefrontBackend>, delay: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            backend,
            delay,
            max_query_len: MAX_SEARCH_QUERY_LEN,
            pending: None,
            last_issued: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    pub fn from_config(backend: Arc<dyn StorefrontBackend>, config: &ClientConfig) -> Self {
        let mut dispatcher = Self::new(backend, config.debounce());
        dispatcher.max_query_len = config.search.max_query_len;
        dispatcher
    }

    /// Handles an edit of the search box.
    ///
    /// The text is trimmed first. Empty text does nothing at all: no search,
    /// and a search already scheduled still fires. Text over the length
    /// limit is ignored the same way. Any other text replaces the scheduled
    /// search with one for the trimmed text, due `delay` from now.
    pub fn on_input_changed(&mut self, text: &str) {
        let query = match validate_search_query(text, self.max_query_len) {
            Ok(query) => query,
            Err(err) => {
                warn!(len = text.chars().count(), error = %err, "Search input ignored");
                return;
            }
        };

        if query.is_empty() {
            debug!("Empty search input ignored");
            return;
        }

        self.cancel_pending();

        let seq = self.last_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let deadline = Instant::now() + self.delay;
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let backend = Arc::clone(&self.backend);
        let last_issued = Arc::clone(&self.last_issued);
        let state = Arc::clone(&self.state);

        debug!(seq, query = %query, "Search scheduled");

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_rx => {
                    debug!(seq, "Search cancelled before dispatch");
                    return;
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }

            debug!(seq, query = %query, "Dispatching search");
            let outcome = backend.search_catalog(&query).await;

            let latest = last_issued.load(Ordering::SeqCst);
            if latest != seq {
                debug!(seq, latest, "Discarding stale search response");
                return;
            }

            let next = match outcome {
                Ok(products) => {
                    debug!(seq, count = products.len(), "Search results received");
                    SearchState::Results {
                        seq,
                        query,
                        products,
                    }
                }
                Err(err) => {
                    warn!(seq, query = %query, error = %err, "Search failed");
                    SearchState::Failed {
                        seq,
                        query,
                        message: err.to_string(),
                    }
                }
            };
            state.send_replace(next);
        });

        self.pending = Some(SearchTicket {
            seq,
            cancel: cancel_tx,
        });
    }

    /// Cancels the scheduled search, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(ticket) = self.pending.take() {
            if ticket.is_pending() {
                debug!(seq = ticket.seq(), "Cancelling scheduled search");
            }
            ticket.cancel();
        }
    }

    /// True while a search is scheduled but not yet sent.
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(SearchTicket::is_pending)
    }

    /// Sequence number of the most recently scheduled search (0 before any).
    pub fn last_issued(&self) -> u64 {
        self.last_issued.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn latest(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for SearchDispatcher {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{product, FakeBackend};
    use tokio::time::sleep;

    fn phones() -> Arc<FakeBackend> {
        Arc::new(FakeBackend::with_catalog(vec![
            product("p1", "iPhone XR", 100),
            product("p2", "Pixel 6", 80),
            product("p3", "Basketball", 10),
        ]))
    }

    fn dispatcher(backend: &Arc<FakeBackend>) -> SearchDispatcher {
        SearchDispatcher::new(backend.clone(), DEFAULT_DEBOUNCE)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_sends_one_search_after_quiet_period() {
        let backend = phones();
        let mut search = dispatcher(&backend);
        let start = Instant::now();

        for text in ["p", "ph", "pho"] {
            search.on_input_changed(text);
            sleep(Duration::from_millis(100)).await;
        }
        search.on_input_changed("phon");
        sleep(Duration::from_secs(2)).await;

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "phon");

        let fired_after = calls[0].0 - start;
        assert!(fired_after >= Duration::from_millis(800));
        assert!(fired_after < Duration::from_millis(810));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_sent_before_delay() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed("pixel");
        assert!(search.has_pending());

        sleep(Duration::from_millis(499)).await;
        assert!(backend.search_calls().is_empty());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.search_calls().len(), 1);
        assert!(!search.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_are_published() {
        let backend = phones();
        let mut search = dispatcher(&backend);
        let mut rx = search.subscribe();

        search.on_input_changed("pixel");
        rx.changed().await.unwrap();

        match rx.borrow().clone() {
            SearchState::Results {
                seq,
                query,
                products,
            } => {
                assert_eq!(seq, 1);
                assert_eq!(query, "pixel");
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].id, "p2");
            }
            other => panic!("expected results, got {:?}", other),
        }
        assert_eq!(search.latest().seq(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_is_ignored() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed("");
        assert!(!search.has_pending());
        assert_eq!(search.last_issued(), 0);

        sleep(Duration::from_secs(1)).await;
        assert!(backend.search_calls().is_empty());
        assert_eq!(search.latest(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_does_not_cancel_scheduled_search() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed("ball");
        sleep(Duration::from_millis(100)).await;
        search.on_input_changed("");
        sleep(Duration::from_secs(1)).await;

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "ball");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_published_without_retry() {
        let backend = phones();
        backend.state().fail_search = true;
        let mut search = dispatcher(&backend);

        search.on_input_changed("iphone");
        sleep(Duration::from_secs(5)).await;

        assert_eq!(backend.search_calls().len(), 1);
        match search.latest() {
            SearchState::Failed { seq, query, .. } => {
                assert_eq!(seq, 1);
                assert_eq!(query, "iphone");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let backend = phones();
        backend
            .state()
            .search_delays
            .insert("slow".to_string(), Duration::from_secs(2));
        let mut search = dispatcher(&backend);

        // "slow" goes out at t=500 and answers at t=2500.
        search.on_input_changed("slow");
        sleep(Duration::from_millis(600)).await;

        // "pixel" goes out at t=1100 and answers immediately.
        search.on_input_changed("pixel");
        sleep(Duration::from_secs(3)).await;

        assert_eq!(backend.search_calls().len(), 2);
        assert_eq!(search.last_issued(), 2);
        match search.latest() {
            SearchState::Results { seq, query, .. } => {
                assert_eq!(seq, 2);
                assert_eq!(query, "pixel");
            }
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlong_input_is_ignored() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed(&"x".repeat(101));
        assert!(!search.has_pending());
        assert_eq!(search.last_issued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_is_trimmed_before_search() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed("   ");
        assert_eq!(search.last_issued(), 0);

        search.on_input_changed("  pixel ");
        sleep(Duration::from_secs(1)).await;

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "pixel");
        assert!(matches!(
            search.latest(),
            SearchState::Results { ref query, .. } if query == "pixel"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_length_limit_applies() {
        let backend = phones();
        let mut config = ClientConfig::default();
        config.search.max_query_len = 5;
        let mut search = SearchDispatcher::from_config(backend.clone(), &config);

        search.on_input_changed("basketball");
        assert_eq!(search.last_issued(), 0);

        search.on_input_changed("ball");
        assert_eq!(search.last_issued(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed("pixel");
        search.cancel_pending();
        assert!(!search.has_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(backend.search_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_scheduled_search() {
        let backend = phones();
        let mut search = dispatcher(&backend);

        search.on_input_changed("pixel");
        drop(search);

        sleep(Duration::from_secs(1)).await;
        assert!(backend.search_calls().is_empty());
    }
}
