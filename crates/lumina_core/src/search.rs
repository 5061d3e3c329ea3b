//! crates/lumina_core/src/search.rs
//!
//! Search-as-you-type against a [`BookSearchClient`].
//!
//! A lookup only fires once the input has been stable for a quiet period and
//! is long enough to be useful. New input cancels a lookup that has not fired
//! yet; a lookup already in flight runs to completion and its (possibly
//! stale) result is still delivered, tagged with the query it answers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ports::{BookSearchClient, SearchCandidate};

pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(500);
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Results {
        query: String,
        candidates: Vec<SearchCandidate>,
    },
    /// A soft failure: report it and carry on.
    Failed { query: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// A lookup will fire after the quiet period unless more input arrives.
    Scheduled,
    /// The query is under [`MIN_QUERY_CHARS`]; nothing is pending.
    TooShort,
}

pub struct SearchDebouncer {
    client: Arc<dyn BookSearchClient>,
    quiet_period: Duration,
    pending: Option<CancellationToken>,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl SearchDebouncer {
    /// Creates the debouncer and the receiving end of its event channel.
    pub fn new(client: Arc<dyn BookSearchClient>) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            client,
            quiet_period: SEARCH_QUIET_PERIOD,
            pending: None,
            events,
        };
        (debouncer, receiver)
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Feeds the current contents of the search box.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_input(&mut self, input: &str) -> InputOutcome {
        self.cancel_pending();

        let query = input.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return InputOutcome::TooShort;
        }

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let client = self.client.clone();
        let events = self.events.clone();
        let quiet_period = self.quiet_period;
        let query = query.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Search for '{}' superseded before firing", query);
                    return;
                }
                _ = tokio::time::sleep(quiet_period) => {}
            }

            let event = match client.search(&query).await {
                Ok(candidates) => SearchEvent::Results { query, candidates },
                Err(e) => {
                    warn!("Book search for '{}' failed: {}", query, e);
                    SearchEvent::Failed {
                        query,
                        reason: e.to_string(),
                    }
                }
            };
            // The receiver may be gone if the search box was closed.
            let _ = events.send(event);
        });

        InputOutcome::Scheduled
    }

    /// Drops a lookup that has not fired yet, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl BookSearchClient for RecordingClient {
        async fn search(&self, query: &str) -> PortResult<Vec<SearchCandidate>> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(PortError::Unexpected("service unavailable".into()));
            }
            Ok(vec![SearchCandidate {
                title: Some(format!("Result for {}", query)),
                ..Default::default()
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_settled_query_is_searched() {
        let client = Arc::new(RecordingClient::default());
        let (mut debouncer, mut events) = SearchDebouncer::new(client.clone());

        assert_eq!(debouncer.on_input("dun"), InputOutcome::Scheduled);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(debouncer.on_input("dune "), InputOutcome::Scheduled);

        match events.recv().await.unwrap() {
            SearchEvent::Results { query, candidates } => {
                assert_eq!(query, "dune");
                assert_eq!(candidates.len(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(events.try_recv().is_err());
        assert_eq!(*client.queries.lock().unwrap(), vec!["dune".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_cancels_and_never_searches() {
        let client = Arc::new(RecordingClient::default());
        let (mut debouncer, mut events) = SearchDebouncer::new(client.clone());

        debouncer.on_input("dune");
        assert_eq!(debouncer.on_input("du"), InputOutcome::TooShort);
        assert_eq!(debouncer.on_input("  a "), InputOutcome::TooShort);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(events.try_recv().is_err());
        assert!(client.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_softly() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let (mut debouncer, mut events) = SearchDebouncer::new(client);

        debouncer.on_input("foundation");
        let event = events.recv().await.unwrap();
        assert!(matches!(event, SearchEvent::Failed { ref query, .. } if query == "foundation"));
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_is_respected() {
        let client = Arc::new(RecordingClient::default());
        let (debouncer, _events) = SearchDebouncer::new(client.clone());
        let mut debouncer = debouncer.with_quiet_period(Duration::from_millis(100));

        debouncer.on_input("hyperion");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(client.queries.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(client.queries.lock().unwrap().len(), 1);
    }
}
