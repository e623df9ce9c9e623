#![warn(missing_docs)]
//! Livecheck - headless editor/checker synchronization
//!
//! # Overview
//!
//! `livecheck` keeps a text buffer, a cursor, and a remote analysis service (the "checker")
//! in step while the user types. It owns no terminal or window: a front-end feeds it edit
//! actions and container sizes, calls [`EditorShell::tick`] from its event loop, and renders
//! the [`PanelBlock`] model it gets back.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorShell (lifecycle, orientation)       │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  PointInfoView       │  DiagnosticsView     │  ← Derived views
//! │  (latest wins)       │  (filter by file)    │
//! ├──────────────────────┴──────────────────────┤
//! │  AnalysisClient (query / subscribe / pump)  │  ← Checker contract
//! ├─────────────────────────────────────────────┤
//! │  TextWidget + Document (rope, listeners)    │  ← Buffer
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use livecheck::testing::ScriptedClient;
//! use livecheck::{ContainerSize, EditAction, EditorShell, QueryAnswer};
//!
//! let mut shell = EditorShell::new("/a.lean", "example : True := by\n  trivial");
//! shell.attach_client(ScriptedClient::new());
//! shell.activate(ContainerSize::new(120, 40));
//!
//! shell.edit(EditAction::Down);
//! let client = shell.client_mut().unwrap();
//! assert_eq!(client.queries()[0].line, 2);
//! client.complete(0, QueryAnswer::with_state("⊢ True"));
//!
//! assert!(shell.tick());
//! assert_eq!(shell.goal().unwrap().state, "⊢ True");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - rope-backed buffer with synchronous change listeners
//! - [`client`] - the checker contract: pending queries, diagnostics feed, subscriptions
//! - [`diagnostics_view`] - per-file filtering of the diagnostics feed
//! - [`point_info`] - goal queries that only ever show the latest cursor's answer
//! - [`widget`] - cursor movement and editing over a [`Document`]
//! - [`layout`] - stacked vs side-by-side orientation
//! - [`panel`] - front-end-neutral render model
//! - [`shell`] - composition and lifecycle

pub mod client;
pub mod diagnostics;
pub mod diagnostics_view;
pub mod document;
pub mod layout;
pub mod panel;
pub mod point_info;
pub mod position;
pub mod shell;
pub mod testing;
pub mod widget;

pub use client::{
    AnalysisClient, DiagnosticsFeed, PendingQuery, QueryAnswer, QueryError, QueryResponder,
    QueryResult, Subscription,
};
pub use diagnostics::{Diagnostic, DiagnosticBatch, Severity, diagnostics_for_file};
pub use diagnostics_view::DiagnosticsView;
pub use document::{Document, ListenerId};
pub use layout::{ContainerSize, Orientation, OrientationTracker};
pub use panel::{BlockKind, PanelBlock};
pub use point_info::{PointInfo, PointInfoView};
pub use position::CursorPosition;
pub use shell::{CheckerStatus, EditorShell};
pub use widget::{EditAction, EditOutcome, TextWidget};
