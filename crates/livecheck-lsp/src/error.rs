//! Errors raised by the checker connection.

use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failures of the checker process or its transport.
///
/// These are connection-level failures. A request the server answers with a JSON-RPC error is
/// not a `ClientError`; it fails only that query (see [`livecheck::QueryError::Server`]).
pub enum ClientError {
    #[error("checker i/o failed: {0}")]
    /// Spawning the process or reading/writing its pipes failed.
    Io(#[from] io::Error),

    #[error("checker message is malformed: {0}")]
    /// A frame could not be parsed.
    Malformed(String),

    #[error("checker connection closed: {0}")]
    /// The reader or writer thread stopped.
    Closed(String),

    #[error("checker did not answer `initialize` within {0:?}")]
    /// The handshake did not complete in time.
    InitializeTimeout(Duration),

    #[error("checker rejected `initialize`: {0}")]
    /// The server answered `initialize` with an error.
    InitializeFailed(String),
}

impl ClientError {
    /// Text suitable for a [`livecheck::QueryError::Transport`].
    pub(crate) fn to_transport(&self) -> livecheck::QueryError {
        livecheck::QueryError::Transport(self.to_string())
    }
}
