//! The checker contract.
//!
//! An [`AnalysisClient`] answers point queries asynchronously and pushes complete diagnostics
//! snapshots to subscribers. There is no cancellation: a [`PendingQuery`] either completes,
//! fails, or never resolves, and callers decide whether the answer is still wanted.
//!
//! Everything here is runtime-agnostic. [`PendingQuery`] implements [`Future`] for async
//! callers, and also offers [`PendingQuery::try_take`] for cooperative event loops that poll
//! once per frame.

use crate::diagnostics::DiagnosticBatch;
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::task::{Context, Poll};
use thiserror::Error;

/// The checker's answer to a point query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryAnswer {
    /// Pre-formatted goal state, if the checker had anything to say at that position.
    pub state: Option<String>,
}

impl QueryAnswer {
    /// An answer with nothing to report.
    pub fn absent() -> Self {
        Self { state: None }
    }

    /// An answer carrying goal text.
    pub fn with_state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
        }
    }

    /// The goal text, treating an empty string as absent.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Asynchronous query failures. All of them are transient from the view's point of view.
pub enum QueryError {
    #[error("query was abandoned before it completed")]
    /// The responder was dropped without answering.
    Cancelled,

    #[error("checker error {code}: {message}")]
    /// The checker answered with an error.
    Server {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    #[error("checker transport failed: {0}")]
    /// The request could not be delivered.
    Transport(String),
}

/// Result of a point query.
pub type QueryResult = Result<QueryAnswer, QueryError>;

/// Completion side of a [`PendingQuery`], held by the client until the answer arrives.
#[derive(Debug)]
pub struct QueryResponder {
    tx: oneshot::Sender<QueryResult>,
}

impl QueryResponder {
    /// Deliver a successful answer.
    pub fn complete(self, answer: QueryAnswer) {
        self.finish(Ok(answer));
    }

    /// Deliver a failure.
    pub fn fail(self, error: QueryError) {
        self.finish(Err(error));
    }

    /// Deliver a result.
    pub fn finish(self, result: QueryResult) {
        if self.tx.send(result).is_err() {
            tracing::trace!("query answer dropped: nobody is waiting");
        }
    }

    /// `true` once the [`PendingQuery`] has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_canceled()
    }
}

/// An in-flight point query.
#[derive(Debug)]
pub struct PendingQuery {
    rx: oneshot::Receiver<QueryResult>,
    done: bool,
}

impl PendingQuery {
    /// Create a linked responder/query pair.
    pub fn channel() -> (QueryResponder, PendingQuery) {
        let (tx, rx) = oneshot::channel();
        (QueryResponder { tx }, PendingQuery { rx, done: false })
    }

    /// A query that is already complete.
    pub fn ready(result: QueryResult) -> Self {
        let (responder, query) = Self::channel();
        responder.finish(result);
        query
    }

    /// Take the result if it has arrived, without blocking.
    ///
    /// Returns `Some` exactly once; afterwards the query is spent and this returns `None`.
    pub fn try_take(&mut self) -> Option<QueryResult> {
        if self.done {
            return None;
        }
        match self.rx.try_recv() {
            Ok(Some(result)) => {
                self.done = true;
                Some(result)
            }
            Ok(None) => None,
            Err(oneshot::Canceled) => {
                self.done = true;
                Some(Err(QueryError::Cancelled))
            }
        }
    }

    /// `true` once the result has been taken.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl Future for PendingQuery {
    type Output = QueryResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(result) => {
                this.done = true;
                Poll::Ready(result.unwrap_or(Err(QueryError::Cancelled)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A live registration on a [`DiagnosticsFeed`].
///
/// Dropping a subscription disposes it. [`Subscription::dispose`] may be called any number of
/// times; after the first call no batch is ever yielded again.
#[derive(Debug)]
pub struct Subscription {
    rx: Option<mpsc::Receiver<DiagnosticBatch>>,
}

impl Subscription {
    /// A subscription that never yields (for clients that have no feed yet).
    pub fn closed() -> Self {
        Self { rx: None }
    }

    /// `true` until disposed or until the feed goes away.
    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    /// Stop delivery. Idempotent.
    pub fn dispose(&mut self) {
        self.rx = None;
    }

    /// Take the next delivered batch, if any, without blocking.
    pub fn try_next_batch(&mut self) -> Option<DiagnosticBatch> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(batch) => Some(batch),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.rx = None;
                None
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Publisher side of the diagnostics feed.
///
/// Keeps the latest snapshot so late subscribers start from the current state instead of
/// waiting for the next change.
#[derive(Debug, Default)]
pub struct DiagnosticsFeed {
    subscribers: Vec<mpsc::Sender<DiagnosticBatch>>,
    latest: Option<DiagnosticBatch>,
}

impl DiagnosticsFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        if let Some(latest) = &self.latest {
            let _ = tx.send(latest.clone());
        }
        self.subscribers.push(tx);
        Subscription { rx: Some(rx) }
    }

    /// Push a complete snapshot to every live subscriber, pruning disposed ones.
    pub fn publish(&mut self, batch: impl Into<DiagnosticBatch>) {
        let batch = batch.into();
        self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
        tracing::trace!(
            diagnostics = batch.len(),
            subscribers = self.subscribers.len(),
            "published diagnostics snapshot"
        );
        self.latest = Some(batch);
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<&DiagnosticBatch> {
        self.latest.as_ref()
    }

    /// Number of subscribers that were live at the last publish or subscribe.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// The remote checker, as seen by the views.
///
/// Implementations must not block: `query` returns immediately and `pump` only drains what
/// has already arrived. Document notifications are fire-and-forget; delivery failures are
/// reported from the next `pump`.
pub trait AnalysisClient {
    /// Error reported by [`AnalysisClient::pump`].
    type Error: std::error::Error;

    /// A document was mounted with `text`.
    fn open(&mut self, file: &str, text: &str);

    /// The document's full text changed; `version` grows monotonically.
    fn change(&mut self, file: &str, version: u64, text: &str);

    /// The document was unmounted.
    fn close(&mut self, file: &str);

    /// Ask for the goal state at `line` (1-based) / `column` (0-based).
    fn query(&mut self, file: &str, line: u32, column: u32) -> PendingQuery;

    /// Subscribe to complete diagnostics snapshots across all open files.
    fn subscribe(&mut self) -> Subscription;

    /// Deliver whatever completions and snapshots have arrived.
    fn pump(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, Severity};

    fn batch(files: &[&str]) -> Vec<Diagnostic> {
        files
            .iter()
            .map(|file| Diagnostic {
                file: file.to_string(),
                line: 1,
                column: 0,
                severity: Severity::Information,
                caption: String::new(),
                text: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_try_take_yields_once() {
        let (responder, mut query) = PendingQuery::channel();
        assert_eq!(query.try_take(), None);
        responder.complete(QueryAnswer::with_state("⊢ p"));
        assert_eq!(query.try_take(), Some(Ok(QueryAnswer::with_state("⊢ p"))));
        assert_eq!(query.try_take(), None);
        assert!(query.is_done());
    }

    #[test]
    fn test_dropped_responder_cancels() {
        let (responder, mut query) = PendingQuery::channel();
        drop(responder);
        assert_eq!(query.try_take(), Some(Err(QueryError::Cancelled)));
    }

    #[test]
    fn test_pending_query_is_a_future() {
        let query = PendingQuery::ready(Ok(QueryAnswer::absent()));
        assert_eq!(futures::executor::block_on(query), Ok(QueryAnswer::absent()));
    }

    #[test]
    fn test_empty_state_counts_as_absent() {
        assert_eq!(QueryAnswer::with_state("").state(), None);
        assert_eq!(QueryAnswer::with_state("x").state(), Some("x"));
    }

    #[test]
    fn test_feed_replays_latest_and_prunes() {
        let mut feed = DiagnosticsFeed::new();
        let mut first = feed.subscribe();
        feed.publish(batch(&["/a.lean"]));

        let mut late = feed.subscribe();
        assert_eq!(late.try_next_batch().map(|b| b.len()), Some(1));
        assert_eq!(first.try_next_batch().map(|b| b.len()), Some(1));

        first.dispose();
        first.dispose();
        feed.publish(batch(&["/a.lean", "/b.lean"]));
        assert_eq!(feed.subscriber_count(), 1);
        assert_eq!(first.try_next_batch(), None);
        assert_eq!(late.try_next_batch().map(|b| b.len()), Some(2));
    }

    #[test]
    fn test_subscription_closes_with_feed() {
        let mut feed = DiagnosticsFeed::new();
        let mut sub = feed.subscribe();
        drop(feed);
        assert_eq!(sub.try_next_batch(), None);
        assert!(!sub.is_active());
    }
}
