//! Editor shell: owns the document and widget, wires them to the checker and the views.
//!
//! Lifecycle:
//! 1. [`EditorShell::new`] creates the [`Document`].
//! 2. [`EditorShell::activate`] builds the [`TextWidget`], registers the persistence listener,
//!    opens the document on the checker (if one is attached), subscribes the diagnostics view
//!    and measures the container.
//! 3. [`EditorShell::edit`], [`EditorShell::resize`] and [`EditorShell::tick`] run from the
//!    front-end's event loop.
//! 4. [`EditorShell::deactivate`] (or dropping the shell) tears all of it down exactly once.
//!
//! The checker may arrive after activation: until [`EditorShell::attach_client`] is called the
//! shell edits normally and simply has nothing to query.

use crate::client::AnalysisClient;
use crate::diagnostics::Diagnostic;
use crate::diagnostics_view::DiagnosticsView;
use crate::document::{Document, ListenerId};
use crate::layout::{ContainerSize, Orientation, OrientationTracker};
use crate::panel::{PanelBlock, build_panel};
use crate::point_info::{PointInfo, PointInfoView};
use crate::position::CursorPosition;
use crate::widget::{EditAction, EditOutcome, TextWidget};
use std::cell::RefCell;
use std::rc::Rc;

type ValueSink = Rc<RefCell<dyn FnMut(&str)>>;

/// Checker availability as seen by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerStatus {
    /// No checker attached yet.
    Waiting,
    /// Checker attached and healthy.
    Ready,
    /// The checker reported a failure; displayed state is frozen at its last good value.
    Failed(String),
}

/// One editor + info panel bound to one file.
pub struct EditorShell<C: AnalysisClient> {
    document: Document,
    widget: Option<TextWidget>,
    client: Option<C>,
    diagnostics: DiagnosticsView,
    point_info: PointInfoView,
    cursor: Option<CursorPosition>,
    orientation: OrientationTracker,
    value_sink: Option<ValueSink>,
    value_listener: Option<ListenerId>,
    status: CheckerStatus,
    active: bool,
}

impl<C: AnalysisClient> EditorShell<C> {
    /// Create an inactive shell for `path`.
    pub fn new(path: impl Into<String>, initial_text: &str) -> Self {
        let document = Document::create(path, initial_text);
        let file = document.path().to_string();
        Self {
            document,
            widget: None,
            client: None,
            diagnostics: DiagnosticsView::new(file.clone()),
            point_info: PointInfoView::new(file),
            cursor: None,
            orientation: OrientationTracker::new(),
            value_sink: None,
            value_listener: None,
            status: CheckerStatus::Waiting,
            active: false,
        }
    }

    /// Set the persistence callback that receives the full text after every edit.
    ///
    /// Takes effect on the next [`EditorShell::activate`].
    pub fn on_value_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.value_sink = Some(Rc::new(RefCell::new(callback)));
        self
    }

    /// Hand the shell a ready checker. Replaces (and disconnects) any previous one.
    pub fn attach_client(&mut self, client: C) {
        if self.active {
            self.disconnect();
        }
        self.client = Some(client);
        self.status = CheckerStatus::Ready;
        if self.active {
            self.connect();
        }
    }

    /// The attached checker.
    pub fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    /// The attached checker, mutably.
    pub fn client_mut(&mut self) -> Option<&mut C> {
        self.client.as_mut()
    }

    /// Mount: build the widget, register listeners and the feed subscription, measure.
    pub fn activate(&mut self, container: ContainerSize) {
        if self.active {
            return;
        }
        self.active = true;
        self.widget = Some(TextWidget::new(&self.document));

        if let Some(sink) = &self.value_sink {
            let sink = Rc::clone(sink);
            let id = self
                .document
                .on_change(move |text| (&mut *sink.borrow_mut())(text));
            self.value_listener = Some(id);
        }

        self.connect();
        self.orientation.update(container);
        tracing::info!(file = self.document.path(), "editor shell activated");
    }

    /// Unmount: dispose the widget, listeners and subscription. Idempotent.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Some(mut widget) = self.widget.take() {
            widget.dispose();
        }
        if let Some(id) = self.value_listener.take() {
            self.document.remove_listener(id);
        }
        self.disconnect();
        self.cursor = None;
        tracing::info!(file = self.document.path(), "editor shell deactivated");
    }

    /// `true` between activate and deactivate.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply an input action, forwarding content and cursor changes.
    pub fn edit(&mut self, action: EditAction) -> EditOutcome {
        let Some(widget) = self.widget.as_mut() else {
            return EditOutcome::default();
        };
        let outcome = widget.apply(&mut self.document, action);

        if outcome.content_changed
            && let Some(client) = self.client.as_mut()
        {
            client.change(
                self.document.path(),
                self.document.version(),
                &self.document.get_value(),
            );
        }

        if let Some(cursor) = outcome.cursor {
            self.cursor = Some(cursor);
            if let Some(client) = self.client.as_mut() {
                self.point_info.cursor_changed(client, cursor);
            }
        }

        outcome
    }

    /// Container was resized. Returns the new orientation on a regime crossing.
    pub fn resize(&mut self, container: ContainerSize) -> Option<Orientation> {
        let changed = self.orientation.update(container);
        if let Some(orientation) = changed {
            tracing::debug!(?orientation, "panel orientation changed");
        }
        changed
    }

    /// Tell the widget how many cells of text are visible.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        if let Some(widget) = self.widget.as_mut() {
            widget.set_viewport(&self.document, width, height);
        }
    }

    /// Pump the checker and poll both views. Returns `true` if anything visible changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        if let Some(client) = self.client.as_mut()
            && let Err(err) = client.pump()
        {
            let message = err.to_string();
            if self.status != CheckerStatus::Failed(message.clone()) {
                tracing::warn!(error = %message, "checker failed; keeping last known state");
                self.status = CheckerStatus::Failed(message);
                changed = true;
            }
        }

        changed |= self.point_info.poll();
        changed |= self.diagnostics.poll();
        changed
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The widget, while active.
    pub fn widget(&self) -> Option<&TextWidget> {
        self.widget.as_ref()
    }

    /// The last cursor the widget reported.
    pub fn cursor(&self) -> Option<CursorPosition> {
        self.cursor
    }

    /// Current panel orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation.current()
    }

    /// Goal currently shown.
    pub fn goal(&self) -> Option<&PointInfo> {
        self.point_info.displayed()
    }

    /// Diagnostics currently shown.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.displayed()
    }

    /// `true` while the diagnostics subscription is held.
    pub fn is_subscribed(&self) -> bool {
        self.diagnostics.is_subscribed()
    }

    /// Checker availability.
    pub fn status(&self) -> &CheckerStatus {
        &self.status
    }

    /// Render model for the info panel.
    pub fn panel(&self) -> Vec<PanelBlock> {
        build_panel(self.goal(), self.diagnostics())
    }

    fn connect(&mut self) {
        let Some(client) = self.client.as_mut() else {
            return;
        };
        client.open(self.document.path(), &self.document.get_value());
        self.diagnostics.activate(client);
        if let Some(cursor) = self.cursor {
            self.point_info.cursor_changed(client, cursor);
        }
    }

    fn disconnect(&mut self) {
        self.diagnostics.deactivate();
        self.point_info.reset();
        if let Some(client) = self.client.as_mut() {
            client.close(self.document.path());
        }
    }
}

impl<C: AnalysisClient> Drop for EditorShell<C> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
