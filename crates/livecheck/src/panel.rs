//! Front-end-neutral render model for the info panel.
//!
//! The panel is a goal block (when there is one) followed by one block per diagnostic, in feed
//! order. Bodies are pre-formatted by the checker and must be drawn verbatim, keeping
//! whitespace and line breaks.

use crate::diagnostics::{Diagnostic, Severity};
use crate::point_info::PointInfo;

/// What a block shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// The goal at the cursor.
    Goal,
    /// A diagnostic of the given severity.
    Message(Severity),
}

/// One header + body block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelBlock {
    /// Kind, used by front-ends to pick colours.
    pub kind: BlockKind,
    /// Single-line header.
    pub header: String,
    /// Verbatim body.
    pub body: String,
}

impl PanelBlock {
    /// Block for the goal at the cursor.
    pub fn goal(info: &PointInfo) -> Self {
        Self {
            kind: BlockKind::Goal,
            header: info.header(),
            body: info.state.clone(),
        }
    }

    /// Block for a diagnostic.
    pub fn message(diagnostic: &Diagnostic) -> Self {
        Self {
            kind: BlockKind::Message(diagnostic.severity),
            header: diagnostic.header(),
            body: diagnostic.text.clone(),
        }
    }
}

/// Build the panel: goal first, then diagnostics.
pub fn build_panel(goal: Option<&PointInfo>, diagnostics: &[Diagnostic]) -> Vec<PanelBlock> {
    goal.map(PanelBlock::goal)
        .into_iter()
        .chain(diagnostics.iter().map(PanelBlock::message))
        .collect()
}
