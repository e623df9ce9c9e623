//! [`AnalysisClient`] over an LSP checker process.
//!
//! Goal queries become requests for the configured goal method; `publishDiagnostics`
//! notifications are folded into a per-file table and republished as whole snapshots.
//! Everything is driven from [`AnalysisClient::pump`], which only drains what the reader
//! thread has already decoded.

use crate::coords::{char_to_utf16_column, line_of};
use crate::diagnostics::{DiagnosticsTable, parse_publish_diagnostics};
use crate::error::ClientError;
use crate::goal::extract_goal_state;
use crate::rpc::Connection;
use crate::uri::{path_to_uri, uri_to_path};
use livecheck::{
    AnalysisClient, DiagnosticsFeed, PendingQuery, QueryError, QueryResponder, Subscription,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Command;
use std::time::{Duration, Instant};

/// Goal request understood by the Lean 4 language server.
pub const DEFAULT_GOAL_METHOD: &str = "$/lean/plainGoal";

/// Settings for one checker session.
#[derive(Debug, Clone)]
pub struct CheckerOptions {
    /// The exact JSON params for the `initialize` request.
    pub initialize_params: Value,
    /// How long to wait for the `initialize` response.
    pub initialize_timeout: Duration,
    /// Request method used for goal queries.
    pub goal_method: String,
    /// `languageId` sent with `didOpen`.
    pub language_id: String,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            initialize_params: default_initialize_params(None),
            initialize_timeout: Duration::from_secs(30),
            goal_method: DEFAULT_GOAL_METHOD.to_string(),
            language_id: "lean".to_string(),
        }
    }
}

/// Minimal `initialize` params: process id, optional root, and plain-text diagnostics.
pub fn default_initialize_params(root_uri: Option<&str>) -> Value {
    json!({
        "processId": std::process::id(),
        "clientInfo": { "name": "livecheck", "version": env!("CARGO_PKG_VERSION") },
        "rootUri": root_uri,
        "capabilities": {
            "textDocument": {
                "synchronization": { "didSave": false, "dynamicRegistration": false },
                "publishDiagnostics": { "relatedInformation": false },
                "hover": { "contentFormat": ["plaintext", "markdown"] },
            },
            "window": { "workDoneProgress": false },
        },
    })
}

#[derive(Debug)]
struct TrackedDocument {
    uri: String,
    text: String,
}

/// A checker session.
pub struct LspChecker {
    conn: Connection,
    goal_method: String,
    language_id: String,
    server_name: Option<String>,
    documents: HashMap<String, TrackedDocument>,
    uri_to_file: HashMap<String, String>,
    pending: HashMap<u64, QueryResponder>,
    table: DiagnosticsTable,
    feed: DiagnosticsFeed,
    broken: Option<String>,
}

impl LspChecker {
    /// Spawn `cmd` and complete the `initialize` handshake.
    ///
    /// Blocks until the server answers `initialize` or the timeout expires; a successful
    /// return is the checker's "ready" signal.
    pub fn start(cmd: Command, options: CheckerOptions) -> Result<Self, ClientError> {
        let conn = Connection::spawn(cmd)?;
        Self::connect(conn, options)
    }

    /// Complete the handshake over an existing connection.
    pub fn connect(conn: Connection, options: CheckerOptions) -> Result<Self, ClientError> {
        let CheckerOptions {
            initialize_params,
            initialize_timeout,
            goal_method,
            language_id,
        } = options;

        let mut checker = Self {
            conn,
            goal_method,
            language_id,
            server_name: None,
            documents: HashMap::new(),
            uri_to_file: HashMap::new(),
            pending: HashMap::new(),
            table: DiagnosticsTable::new(),
            feed: DiagnosticsFeed::new(),
            broken: None,
        };
        checker.initialize(initialize_params, initialize_timeout)?;
        Ok(checker)
    }

    fn initialize(&mut self, params: Value, timeout: Duration) -> Result<(), ClientError> {
        let id = self.conn.request("initialize", params)?;
        let deadline = Instant::now() + timeout;

        let response = loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(ClientError::InitializeTimeout(timeout));
            }
            let Some(msg) = self.conn.recv_timeout(deadline - now)? else {
                return Err(ClientError::InitializeTimeout(timeout));
            };
            if msg.get("method").is_none() && msg.get("id").and_then(Value::as_u64) == Some(id) {
                break msg;
            }
            // Servers may log or ask for configuration before answering.
            self.dispatch(msg)?;
        };

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(ClientError::InitializeFailed(message.to_string()));
        }

        self.server_name = response
            .pointer("/result/serverInfo/name")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.conn.notify("initialized", json!({}))?;

        tracing::info!(
            server = self.server_name.as_deref().unwrap_or("unknown"),
            "checker initialized"
        );
        Ok(())
    }

    /// `serverInfo.name` from the `initialize` response.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Goal queries still waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// `true` once the connection has failed.
    pub fn is_broken(&self) -> bool {
        self.broken.is_some()
    }

    fn notify(&mut self, method: &str, params: Value) {
        if self.broken.is_some() {
            return;
        }
        if let Err(err) = self.conn.notify(method, params) {
            self.mark_broken(&err);
        }
    }

    fn mark_broken(&mut self, err: &ClientError) {
        if self.broken.is_some() {
            return;
        }
        tracing::warn!(error = %err, pending = self.pending.len(), "checker connection lost");
        self.broken = Some(err.to_string());
        for (_, responder) in self.pending.drain() {
            responder.fail(err.to_transport());
        }
    }

    /// Handle one inbound message. Returns `true` if the diagnostics table changed.
    fn dispatch(&mut self, msg: Value) -> Result<bool, ClientError> {
        let method = msg.get("method").and_then(Value::as_str);

        match (method, msg.get("id")) {
            (Some(method), Some(id)) => {
                let result = server_request_default(method, &msg);
                tracing::debug!(method, "answering server request");
                self.conn.respond(id.clone(), result)?;
                Ok(false)
            }
            (None, Some(id)) => {
                self.complete_response(id, &msg);
                Ok(false)
            }
            (Some(method), None) => Ok(self.handle_notification(method, &msg)),
            (None, None) => {
                tracing::debug!("ignoring message without method or id");
                Ok(false)
            }
        }
    }

    fn complete_response(&mut self, id: &Value, msg: &Value) {
        let Some(responder) = id.as_u64().and_then(|id| self.pending.remove(&id)) else {
            tracing::trace!(%id, "response for untracked request");
            return;
        };

        if let Some(error) = msg.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            tracing::debug!(code, %message, "goal query failed");
            responder.fail(QueryError::Server { code, message });
            return;
        }

        let result = msg.get("result").unwrap_or(&Value::Null);
        responder.complete(extract_goal_state(result));
    }

    fn handle_notification(&mut self, method: &str, msg: &Value) -> bool {
        let params = msg.get("params").unwrap_or(&Value::Null);
        match method {
            "textDocument/publishDiagnostics" => {
                let Some((uri, items)) = parse_publish_diagnostics(params) else {
                    tracing::debug!("malformed publishDiagnostics");
                    return false;
                };
                let file = self.file_for_uri(&uri);
                let text = self.documents.get(&file).map(|doc| doc.text.as_str());
                let diagnostics = items
                    .into_iter()
                    .map(|item| item.into_diagnostic(&file, text))
                    .collect();
                self.table.replace(&file, diagnostics)
            }
            "window/logMessage" | "window/showMessage" => {
                let text = params.get("message").and_then(Value::as_str).unwrap_or("");
                tracing::debug!(target: "livecheck::server", "{text}");
                false
            }
            _ => {
                tracing::trace!(method, "unhandled notification");
                false
            }
        }
    }

    fn file_for_uri(&self, uri: &str) -> String {
        if let Some(file) = self.uri_to_file.get(uri) {
            return file.clone();
        }
        uri_to_path(uri)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|| uri.to_string())
    }

    fn publish_snapshot(&mut self) {
        self.feed.publish(self.table.snapshot());
    }
}

/// Safe answers for server-to-client requests, so the server never blocks on us.
fn server_request_default(method: &str, msg: &Value) -> Value {
    match method {
        "workspace/configuration" => {
            let items = msg
                .pointer("/params/items")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            Value::Array(std::iter::repeat_n(Value::Null, items).collect())
        }
        "workspace/workspaceFolders" => Value::Null,
        "workspace/applyEdit" => json!({
            "applied": false,
            "failureReason": "livecheck does not apply workspace edits",
        }),
        _ => Value::Null,
    }
}

impl AnalysisClient for LspChecker {
    type Error = ClientError;

    fn open(&mut self, file: &str, text: &str) {
        let uri = path_to_uri(file);
        tracing::debug!(file, %uri, "didOpen");
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": self.language_id,
                    "version": 0,
                    "text": text,
                }
            }),
        );
        self.uri_to_file.insert(uri.clone(), file.to_string());
        self.documents.insert(
            file.to_string(),
            TrackedDocument {
                uri,
                text: text.to_string(),
            },
        );
    }

    fn change(&mut self, file: &str, version: u64, text: &str) {
        let Some(doc) = self.documents.get_mut(file) else {
            tracing::debug!(file, "change for a document that is not open");
            return;
        };
        doc.text = text.to_string();
        let params = json!({
            "textDocument": { "uri": doc.uri, "version": version },
            "contentChanges": [{ "text": text }],
        });
        self.notify("textDocument/didChange", params);
    }

    fn close(&mut self, file: &str) {
        let Some(doc) = self.documents.remove(file) else {
            return;
        };
        self.uri_to_file.remove(&doc.uri);
        self.notify(
            "textDocument/didClose",
            json!({ "textDocument": { "uri": doc.uri } }),
        );
        if self.table.remove(file) {
            self.publish_snapshot();
        }
    }

    fn query(&mut self, file: &str, line: u32, column: u32) -> PendingQuery {
        if let Some(reason) = &self.broken {
            return PendingQuery::ready(Err(QueryError::Transport(reason.clone())));
        }

        let line0 = line.saturating_sub(1);
        let (uri, character) = match self.documents.get(file) {
            Some(doc) => {
                let line_text = line_of(&doc.text, line0 as usize);
                let character = char_to_utf16_column(line_text, column as usize);
                (doc.uri.clone(), character)
            }
            None => (path_to_uri(file), column as usize),
        };

        let params = json!({
            "textDocument": { "uri": uri },
            "position": { "line": line0, "character": character },
        });
        let method = self.goal_method.clone();
        match self.conn.request(&method, params) {
            Ok(id) => {
                tracing::debug!(id, line, column, "goal query sent");
                let (responder, query) = PendingQuery::channel();
                self.pending.insert(id, responder);
                query
            }
            Err(err) => {
                self.mark_broken(&err);
                PendingQuery::ready(Err(err.to_transport()))
            }
        }
    }

    fn subscribe(&mut self) -> Subscription {
        self.feed.subscribe()
    }

    fn pump(&mut self) -> Result<(), ClientError> {
        if let Some(reason) = &self.broken {
            return Err(ClientError::Closed(reason.clone()));
        }

        // Abandoned queries will never be read; stop tracking them.
        self.pending.retain(|_, responder| !responder.is_abandoned());

        let mut diagnostics_changed = false;
        let outcome = loop {
            match self.conn.try_recv() {
                Ok(Some(msg)) => match self.dispatch(msg) {
                    Ok(changed) => diagnostics_changed |= changed,
                    Err(err) => break Err(err),
                },
                Ok(None) => break Ok(()),
                Err(err) => break Err(err),
            }
        };

        if diagnostics_changed {
            self.publish_snapshot();
        }
        if let Err(err) = outcome {
            self.mark_broken(&err);
            return Err(err);
        }
        Ok(())
    }
}

impl Drop for LspChecker {
    fn drop(&mut self) {
        if self.broken.is_some() {
            return;
        }
        let Ok(id) = self.conn.request("shutdown", Value::Null) else {
            return;
        };
        let deadline = Instant::now() + Duration::from_millis(300);
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.conn.recv_timeout(remaining) {
                Ok(Some(msg)) if msg.get("id").and_then(Value::as_u64) == Some(id) => break,
                Ok(Some(_)) => continue,
                _ => break,
            }
        }
        let _ = self.conn.notify("exit", Value::Null);
    }
}
