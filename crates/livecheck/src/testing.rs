//! In-memory checker for tests and demos.
//!
//! [`ScriptedClient`] records every call and leaves each query pending until the test
//! completes it, in whatever order the test chooses.

use crate::client::{
    AnalysisClient, DiagnosticsFeed, PendingQuery, QueryAnswer, QueryError, QueryResponder,
    Subscription,
};
use crate::diagnostics::Diagnostic;

/// A query the client has received.
#[derive(Debug)]
pub struct RecordedQuery {
    /// File the query was for.
    pub file: String,
    /// Line (1-based).
    pub line: u32,
    /// Column (0-based).
    pub column: u32,
    responder: Option<QueryResponder>,
}

impl RecordedQuery {
    /// `true` until the test completes or fails the query.
    pub fn is_pending(&self) -> bool {
        self.responder.is_some()
    }
}

/// A document notification the client has received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// `open(file, text)`
    Opened {
        /// File path.
        file: String,
        /// Initial text.
        text: String,
    },
    /// `change(file, version, text)`
    Changed {
        /// File path.
        file: String,
        /// Document version.
        version: u64,
        /// Full text.
        text: String,
    },
    /// `close(file)`
    Closed {
        /// File path.
        file: String,
    },
}

/// Scripted [`AnalysisClient`].
#[derive(Debug, Default)]
pub struct ScriptedClient {
    feed: DiagnosticsFeed,
    queries: Vec<RecordedQuery>,
    events: Vec<DocumentEvent>,
    pump_failure: Option<QueryError>,
    pumps: usize,
}

impl ScriptedClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query received so far, in call order.
    pub fn queries(&self) -> &[RecordedQuery] {
        &self.queries
    }

    /// Every document notification received so far.
    pub fn events(&self) -> &[DocumentEvent] {
        &self.events
    }

    /// Complete query `index` with `answer`.
    ///
    /// # Panics
    ///
    /// Panics if the query does not exist or was already answered.
    pub fn complete(&mut self, index: usize, answer: QueryAnswer) {
        self.take_responder(index).complete(answer);
    }

    /// Fail query `index`.
    ///
    /// # Panics
    ///
    /// Panics if the query does not exist or was already answered.
    pub fn fail(&mut self, index: usize, error: QueryError) {
        self.take_responder(index).fail(error);
    }

    /// Publish a diagnostics snapshot to subscribers.
    pub fn publish(&mut self, batch: Vec<Diagnostic>) {
        self.feed.publish(batch);
    }

    /// Number of live subscribers as of the last publish/subscribe.
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    /// Make the next [`AnalysisClient::pump`] fail with `error`.
    pub fn fail_next_pump(&mut self, error: QueryError) {
        self.pump_failure = Some(error);
    }

    /// Number of pumps so far.
    pub fn pump_count(&self) -> usize {
        self.pumps
    }

    fn take_responder(&mut self, index: usize) -> QueryResponder {
        self.queries
            .get_mut(index)
            .and_then(|q| q.responder.take())
            .unwrap_or_else(|| panic!("query {index} is not pending"))
    }
}

impl AnalysisClient for ScriptedClient {
    type Error = QueryError;

    fn open(&mut self, file: &str, text: &str) {
        self.events.push(DocumentEvent::Opened {
            file: file.to_string(),
            text: text.to_string(),
        });
    }

    fn change(&mut self, file: &str, version: u64, text: &str) {
        self.events.push(DocumentEvent::Changed {
            file: file.to_string(),
            version,
            text: text.to_string(),
        });
    }

    fn close(&mut self, file: &str) {
        self.events.push(DocumentEvent::Closed {
            file: file.to_string(),
        });
    }

    fn query(&mut self, file: &str, line: u32, column: u32) -> PendingQuery {
        let (responder, query) = PendingQuery::channel();
        self.queries.push(RecordedQuery {
            file: file.to_string(),
            line,
            column,
            responder: Some(responder),
        });
        query
    }

    fn subscribe(&mut self) -> Subscription {
        self.feed.subscribe()
    }

    fn pump(&mut self) -> Result<(), Self::Error> {
        self.pumps += 1;
        match self.pump_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
