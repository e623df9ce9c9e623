//! Point-info (goal) view.
//!
//! Every cursor change issues a fresh query. Queries are never cancelled; instead each one is
//! tagged with the position it was issued for, and when it completes its answer is applied
//! only if that position is still the latest requested one. Completions may arrive in any
//! order, so an answer for a superseded position is dropped no matter when it shows up.

use crate::client::{AnalysisClient, PendingQuery, QueryResult};
use crate::position::CursorPosition;

/// Goal state shown for a cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointInfo {
    /// Position the state was computed for.
    pub position: CursorPosition,
    /// Pre-formatted state text, shown verbatim.
    pub state: String,
}

impl PointInfo {
    /// `goal at line:column`, with the column 0-based like the editor's own display.
    pub fn header(&self) -> String {
        format!(
            "goal at {}:{}",
            self.position.line,
            self.position.service_column()
        )
    }
}

#[derive(Debug)]
struct InFlight {
    position: CursorPosition,
    query: PendingQuery,
}

/// Latest-wins goal display for one file.
#[derive(Debug)]
pub struct PointInfoView {
    file: String,
    latest: Option<CursorPosition>,
    in_flight: Vec<InFlight>,
    displayed: Option<PointInfo>,
}

impl PointInfoView {
    /// Create an empty view for `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            latest: None,
            in_flight: Vec::new(),
            displayed: None,
        }
    }

    /// Record `position` as the latest requested one and query the checker for it.
    pub fn cursor_changed<C: AnalysisClient + ?Sized>(
        &mut self,
        client: &mut C,
        position: CursorPosition,
    ) {
        self.latest = Some(position);
        let query = client.query(&self.file, position.line, position.service_column());
        tracing::debug!(file = %self.file, %position, "goal query issued");
        self.in_flight.push(InFlight { position, query });
    }

    /// Apply completed queries. Returns `true` if the displayed goal changed.
    pub fn poll(&mut self) -> bool {
        let latest = self.latest;
        let displayed = &mut self.displayed;
        let mut changed = false;

        self.in_flight.retain_mut(|pending| {
            let Some(result) = pending.query.try_take() else {
                return true;
            };
            if Some(pending.position) == latest {
                changed |= apply_result(displayed, pending.position, result);
            } else {
                tracing::debug!(position = %pending.position, "discarding stale goal answer");
            }
            false
        });

        changed
    }

    /// The goal currently shown.
    pub fn displayed(&self) -> Option<&PointInfo> {
        self.displayed.as_ref()
    }

    /// The most recent cursor position a query was issued for.
    pub fn latest_position(&self) -> Option<CursorPosition> {
        self.latest
    }

    /// Number of queries that have not completed yet.
    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Forget everything: in-flight queries, the latest position and the displayed goal.
    pub fn reset(&mut self) {
        self.in_flight.clear();
        self.latest = None;
        self.displayed = None;
    }
}

fn apply_result(
    displayed: &mut Option<PointInfo>,
    position: CursorPosition,
    result: QueryResult,
) -> bool {
    let next = match result {
        Ok(answer) => answer.state().map(|state| PointInfo {
            position,
            state: state.to_string(),
        }),
        Err(err) => {
            tracing::warn!(%position, error = %err, "goal query failed; keeping previous goal");
            return false;
        }
    };

    if *displayed == next {
        return false;
    }
    *displayed = next;
    true
}
