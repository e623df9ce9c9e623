//! Document model.
//!
//! A [`Document`] owns the full text of one file path plus a version counter that grows by one
//! on every edit. Change listeners run synchronously after each edit and receive the complete
//! current text, never a diff.

use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// Handle returned by [`Document::on_change`], used to unregister the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Change listener callback type.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

/// In-memory text buffer for a single file path.
pub struct Document {
    path: String,
    text: Rope,
    version: u64,
    listeners: Vec<(ListenerId, ChangeCallback)>,
    next_listener: u64,
}

impl Document {
    /// Create a document for `path` holding `initial_text` (version 0).
    pub fn create(path: impl Into<String>, initial_text: &str) -> Self {
        Self {
            path: path.into(),
            text: Rope::from_str(initial_text),
            version: 0,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The file path identifying this document.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Monotonic edit counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The full current text.
    pub fn get_value(&self) -> String {
        self.text.to_string()
    }

    /// Borrow the underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Total length in characters.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Number of lines. `N` line breaks give `N + 1` lines.
    ///
    /// Only `\n`, `\r\n` and a lone `\r` break lines, matching how the checker counts them.
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Text of a 0-based line, without its line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.text.len_lines() {
            return None;
        }
        let mut text = self.text.line(line).to_string();
        trim_line_break(&mut text);
        Some(text)
    }

    /// Length of a 0-based line in characters, without its line break.
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.text.len_lines() {
            return 0;
        }
        let slice = self.text.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        len
    }

    /// Convert a 0-based `(line, column)` into a character offset, clamping out-of-range input.
    pub fn char_offset(&self, line: usize, column: usize) -> usize {
        let last_line = self.line_count().saturating_sub(1);
        let line = line.min(last_line);
        self.text.line_to_char(line) + column.min(self.line_len_chars(line))
    }

    /// Convert a character offset into a 0-based `(line, column)`.
    pub fn position_of(&self, char_offset: usize) -> (usize, usize) {
        let offset = char_offset.min(self.text.len_chars());
        let line = self.text.char_to_line(offset);
        (line, offset - self.text.line_to_char(line))
    }

    /// Register a listener that runs after every edit with the full new text.
    pub fn on_change(&mut self, callback: impl FnMut(&str) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Unregister a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Insert `text` at a character offset (clamped to the end of the document).
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = char_offset.min(self.text.len_chars());
        self.text.insert(offset, text);
        self.commit();
    }

    /// Remove a character range (clamped to the document).
    pub fn remove(&mut self, range: Range<usize>) {
        let len = self.text.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return;
        }
        self.text.remove(start..end);
        self.commit();
    }

    /// Replace the whole text.
    pub fn set_value(&mut self, text: &str) {
        self.text = Rope::from_str(text);
        self.commit();
    }

    fn commit(&mut self) {
        self.version += 1;
        if self.listeners.is_empty() {
            return;
        }
        let text = self.text.to_string();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&text);
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("len_chars", &self.text.len_chars())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn trim_line_break(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
    }
    if text.ends_with('\r') {
        text.pop();
    }
}
