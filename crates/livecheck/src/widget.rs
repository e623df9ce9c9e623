//! Text widget: cursor movement and editing over a [`Document`].
//!
//! The widget does not own the text. It keeps the cursor, the preferred column for vertical
//! motion, and the scroll window; edits go straight into the document, whose listeners see
//! the change synchronously. Horizontal motion steps over whole grapheme clusters.

use crate::document::Document;
use crate::position::CursorPosition;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// An input the widget understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Insert one character at the cursor.
    Insert(char),
    /// Insert text (e.g. a paste) at the cursor.
    InsertText(String),
    /// Insert a line break.
    Newline,
    /// Delete the grapheme before the cursor (joins lines at column 0).
    Backspace,
    /// Delete the grapheme after the cursor (joins lines at end of line).
    Delete,
    /// Move one grapheme left.
    Left,
    /// Move one grapheme right.
    Right,
    /// Move one line up.
    Up,
    /// Move one line down.
    Down,
    /// Move to the start of the line.
    Home,
    /// Move to the end of the line.
    End,
    /// Move one viewport up.
    PageUp,
    /// Move one viewport down.
    PageDown,
    /// Jump to a position (clamped to the document).
    MoveTo(CursorPosition),
}

/// What an [`EditAction`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditOutcome {
    /// The document text changed.
    pub content_changed: bool,
    /// The new cursor, if it moved.
    pub cursor: Option<CursorPosition>,
}

/// Cursor and viewport state bound to one document.
#[derive(Debug, Clone)]
pub struct TextWidget {
    line: usize,
    column: usize,
    preferred_column: Option<usize>,
    scroll_top: usize,
    scroll_left: usize,
    viewport_width: usize,
    viewport_height: usize,
    disposed: bool,
}

impl TextWidget {
    /// Create a widget with the cursor at the start of `document`.
    pub fn new(document: &Document) -> Self {
        tracing::debug!(file = document.path(), "text widget created");
        Self {
            line: 0,
            column: 0,
            preferred_column: None,
            scroll_top: 0,
            scroll_left: 0,
            viewport_width: 80,
            viewport_height: 24,
            disposed: false,
        }
    }

    /// Current cursor (1-based).
    pub fn cursor(&self) -> CursorPosition {
        CursorPosition::from_zero_based(self.line, self.column)
    }

    /// First visible line (0-based).
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// First visible display column.
    pub fn scroll_left(&self) -> usize {
        self.scroll_left
    }

    /// Display column of the cursor (wide characters count as two).
    pub fn visual_column(&self, document: &Document) -> usize {
        let text = document.line_text(self.line).unwrap_or_default();
        let prefix: String = text.chars().take(self.column).collect();
        prefix.width()
    }

    /// Resize the visible window (in cells) and keep the cursor inside it.
    pub fn set_viewport(&mut self, document: &Document, width: usize, height: usize) {
        self.viewport_width = width.max(1);
        self.viewport_height = height.max(1);
        self.scroll_to_cursor(document);
    }

    /// `true` after [`TextWidget::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Detach the widget; further actions are ignored.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Apply an action to `document`.
    pub fn apply(&mut self, document: &mut Document, action: EditAction) -> EditOutcome {
        if self.disposed {
            return EditOutcome::default();
        }

        let before_cursor = self.cursor();
        let before_version = document.version();

        if !matches!(
            action,
            EditAction::Up | EditAction::Down | EditAction::PageUp | EditAction::PageDown
        ) {
            self.preferred_column = None;
        }

        match action {
            EditAction::Insert(ch) => self.insert(document, ch.encode_utf8(&mut [0; 4])),
            EditAction::InsertText(text) => self.insert(document, &text),
            EditAction::Newline => self.insert(document, "\n"),
            EditAction::Backspace => self.backspace(document),
            EditAction::Delete => self.delete(document),
            EditAction::Left => self.move_left(document),
            EditAction::Right => self.move_right(document),
            EditAction::Up => self.move_vertical(document, -1),
            EditAction::Down => self.move_vertical(document, 1),
            EditAction::Home => self.column = 0,
            EditAction::End => self.column = document.line_len_chars(self.line),
            EditAction::PageUp => self.move_vertical(document, -(self.viewport_height as isize)),
            EditAction::PageDown => self.move_vertical(document, self.viewport_height as isize),
            EditAction::MoveTo(pos) => {
                let line = (pos.line.max(1) as usize - 1).min(document.line_count() - 1);
                let column = (pos.column.max(1) as usize - 1).min(document.line_len_chars(line));
                self.line = line;
                self.column = column;
            }
        }

        self.scroll_to_cursor(document);

        let cursor = self.cursor();
        EditOutcome {
            content_changed: document.version() != before_version,
            cursor: (cursor != before_cursor).then_some(cursor),
        }
    }

    fn insert(&mut self, document: &mut Document, text: &str) {
        let offset = document.char_offset(self.line, self.column);
        document.insert(offset, text);
        let (line, column) = document.position_of(offset + text.chars().count());
        self.line = line;
        self.column = column;
    }

    fn backspace(&mut self, document: &mut Document) {
        if self.column > 0 {
            let line_text = document.line_text(self.line).unwrap_or_default();
            let start = previous_boundary(&line_text, self.column);
            let base = document.char_offset(self.line, 0);
            document.remove(base + start..base + self.column);
            self.column = start;
        } else if self.line > 0 {
            let prev = self.line - 1;
            let prev_len = document.line_len_chars(prev);
            let start = document.char_offset(prev, prev_len);
            let end = document.char_offset(self.line, 0);
            document.remove(start..end);
            self.line = prev;
            self.column = prev_len;
        }
    }

    fn delete(&mut self, document: &mut Document) {
        let len = document.line_len_chars(self.line);
        if self.column < len {
            let line_text = document.line_text(self.line).unwrap_or_default();
            let end = next_boundary(&line_text, self.column);
            let base = document.char_offset(self.line, 0);
            document.remove(base + self.column..base + end);
        } else if self.line + 1 < document.line_count() {
            let start = document.char_offset(self.line, len);
            let end = document.char_offset(self.line + 1, 0);
            document.remove(start..end);
        }
    }

    fn move_left(&mut self, document: &Document) {
        if self.column > 0 {
            let line_text = document.line_text(self.line).unwrap_or_default();
            self.column = previous_boundary(&line_text, self.column);
        } else if self.line > 0 {
            self.line -= 1;
            self.column = document.line_len_chars(self.line);
        }
    }

    fn move_right(&mut self, document: &Document) {
        let len = document.line_len_chars(self.line);
        if self.column < len {
            let line_text = document.line_text(self.line).unwrap_or_default();
            self.column = next_boundary(&line_text, self.column);
        } else if self.line + 1 < document.line_count() {
            self.line += 1;
            self.column = 0;
        }
    }

    fn move_vertical(&mut self, document: &Document, delta: isize) {
        let last = document.line_count().saturating_sub(1) as isize;
        let target = (self.line as isize + delta).clamp(0, last) as usize;
        if target == self.line {
            return;
        }
        let preferred = *self.preferred_column.get_or_insert(self.column);
        let line_text = document.line_text(target).unwrap_or_default();
        self.line = target;
        self.column = snap_to_boundary(&line_text, preferred);
    }

    fn scroll_to_cursor(&mut self, document: &Document) {
        if self.line < self.scroll_top {
            self.scroll_top = self.line;
        } else if self.line >= self.scroll_top + self.viewport_height {
            self.scroll_top = self.line + 1 - self.viewport_height;
        }

        let visual = self.visual_column(document);
        if visual < self.scroll_left {
            self.scroll_left = visual;
        } else if visual >= self.scroll_left + self.viewport_width {
            self.scroll_left = visual + 1 - self.viewport_width;
        }
    }
}

/// Grapheme cluster boundaries of `line`, as character offsets (including 0 and the end).
fn grapheme_boundaries(line: &str) -> Vec<usize> {
    let mut boundaries = vec![0];
    let mut chars = 0;
    for grapheme in line.graphemes(true) {
        chars += grapheme.chars().count();
        boundaries.push(chars);
    }
    boundaries
}

fn previous_boundary(line: &str, column: usize) -> usize {
    grapheme_boundaries(line)
        .into_iter()
        .take_while(|b| *b < column)
        .last()
        .unwrap_or(0)
}

fn next_boundary(line: &str, column: usize) -> usize {
    let boundaries = grapheme_boundaries(line);
    let end = boundaries.last().copied().unwrap_or(0);
    boundaries.into_iter().find(|b| *b > column).unwrap_or(end)
}

fn snap_to_boundary(line: &str, column: usize) -> usize {
    grapheme_boundaries(line)
        .into_iter()
        .take_while(|b| *b <= column)
        .last()
        .unwrap_or(0)
}
