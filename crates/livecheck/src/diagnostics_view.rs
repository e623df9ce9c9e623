//! Diagnostics view: the owned file's slice of the checker's diagnostics feed.

use crate::client::{AnalysisClient, Subscription};
use crate::diagnostics::{Diagnostic, DiagnosticBatch, diagnostics_for_file};

/// Shows the diagnostics of exactly one file.
///
/// The view is either subscribed (one live [`Subscription`]) or unsubscribed. Every delivered
/// batch replaces the displayed list wholesale with the batch's entries for the owned file,
/// in batch order. Batches that arrive after [`DiagnosticsView::deactivate`] are never seen.
#[derive(Debug)]
pub struct DiagnosticsView {
    file: String,
    subscription: Option<Subscription>,
    displayed: Vec<Diagnostic>,
}

impl DiagnosticsView {
    /// Create an unsubscribed view for `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            subscription: None,
            displayed: Vec::new(),
        }
    }

    /// The file this view filters for.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// `true` while a subscription is held.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Register the feed subscription. Does nothing if already subscribed.
    pub fn activate<C: AnalysisClient + ?Sized>(&mut self, client: &mut C) {
        if self.subscription.is_some() {
            return;
        }
        self.subscription = Some(client.subscribe());
        tracing::debug!(file = %self.file, "diagnostics view subscribed");
    }

    /// Dispose the subscription. Does nothing if not subscribed.
    pub fn deactivate(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.dispose();
            tracing::debug!(file = %self.file, "diagnostics view unsubscribed");
        }
    }

    /// Consume every batch delivered since the last poll.
    ///
    /// Returns `true` if the displayed list changed.
    pub fn poll(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        let mut changed = false;
        while let Some(batch) = subscription.try_next_batch() {
            changed |= replace_displayed(&mut self.displayed, &batch, &self.file);
        }
        changed
    }

    /// The diagnostics currently shown, in feed order.
    pub fn displayed(&self) -> &[Diagnostic] {
        &self.displayed
    }
}

fn replace_displayed(
    displayed: &mut Vec<Diagnostic>,
    batch: &DiagnosticBatch,
    file: &str,
) -> bool {
    let next = diagnostics_for_file(batch, file);
    tracing::trace!(
        file,
        total = batch.len(),
        kept = next.len(),
        "filtered diagnostics batch"
    );
    if *displayed == next {
        return false;
    }
    *displayed = next;
    true
}
