#![warn(missing_docs)]
//! `livecheck-lsp` - a [`livecheck::AnalysisClient`] backed by an LSP checker process.
//!
//! The checker is spawned as a child process speaking JSON-RPC over stdio. Reader and writer
//! threads move framed messages through channels; [`LspChecker`] dispatches them whenever
//! the host calls [`livecheck::AnalysisClient::pump`], so the host's event loop never blocks
//! on the checker.
//!
//! ```no_run
//! use livecheck::{ContainerSize, EditorShell};
//! use livecheck_lsp::{CheckerOptions, LspChecker};
//! use std::process::{Command, Stdio};
//!
//! let mut cmd = Command::new("lean");
//! cmd.arg("--server").stderr(Stdio::null());
//! let checker = LspChecker::start(cmd, CheckerOptions::default())?;
//!
//! let mut shell = EditorShell::new("scratch.lean", "example : True := trivial");
//! shell.attach_client(checker);
//! shell.activate(ContainerSize::new(120, 40));
//! shell.tick();
//! # Ok::<(), livecheck_lsp::ClientError>(())
//! ```

pub mod checker;
pub mod coords;
pub mod diagnostics;
pub mod error;
pub mod goal;
pub mod rpc;
pub mod transport;
pub mod uri;

pub use checker::{CheckerOptions, DEFAULT_GOAL_METHOD, LspChecker, default_initialize_params};
pub use coords::{char_to_utf16_column, utf16_to_char_column};
pub use diagnostics::{DiagnosticsTable, PublishedItem, parse_publish_diagnostics};
pub use error::ClientError;
pub use goal::extract_goal_state;
pub use rpc::{Connection, Inbound};
pub use transport::{read_message, write_message};
pub use uri::{path_to_uri, uri_to_path};
