//! `textDocument/publishDiagnostics` handling.
//!
//! The server publishes per file; subscribers want one snapshot across every file. The
//! [`DiagnosticsTable`] keeps the latest list per file and flattens it on demand.

use crate::coords::{line_of, utf16_to_char_column};
use livecheck::{Diagnostic, DiagnosticBatch, Severity};
use serde_json::Value;
use std::collections::HashMap;

/// One diagnostic as the server sent it, before the URI is mapped to a file key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedItem {
    /// 0-based line.
    pub line: u32,
    /// 0-based column in UTF-16 code units, as reported.
    pub character: u32,
    /// Severity.
    pub severity: Severity,
    /// Short label (the diagnostic `code`, if any).
    pub caption: String,
    /// Message body.
    pub message: String,
}

impl PublishedItem {
    /// Attach a file key, producing the core's 1-based-line [`Diagnostic`].
    ///
    /// With the file's synced `text`, the UTF-16 column becomes a character column so it
    /// counts the same way the cursor does. Without it the reported column is kept.
    pub fn into_diagnostic(self, file: &str, text: Option<&str>) -> Diagnostic {
        let column = match text {
            Some(text) => {
                let line_text = line_of(text, self.line as usize);
                let chars = utf16_to_char_column(line_text, self.character as usize);
                u32::try_from(chars).unwrap_or(u32::MAX)
            }
            None => self.character,
        };
        Diagnostic {
            file: file.to_string(),
            line: self.line.saturating_add(1),
            column,
            severity: self.severity,
            caption: self.caption,
            text: self.message,
        }
    }
}

/// Map the numeric LSP severity. Hints count as information; a missing severity is an error.
pub fn severity_from_lsp(value: Option<u64>) -> Severity {
    match value {
        Some(2) => Severity::Warning,
        Some(3) | Some(4) => Severity::Information,
        _ => Severity::Error,
    }
}

/// Parse `publishDiagnostics` params into `(uri, items)`. Items without a range are skipped.
pub fn parse_publish_diagnostics(params: &Value) -> Option<(String, Vec<PublishedItem>)> {
    let uri = params.get("uri")?.as_str()?.to_string();
    let items = params
        .get("diagnostics")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(parse_item).collect())
        .unwrap_or_default();
    Some((uri, items))
}

fn parse_item(d: &Value) -> Option<PublishedItem> {
    let start = d.get("range")?.get("start")?;
    let line = u32::try_from(start.get("line")?.as_u64()?).ok()?;
    let character = u32::try_from(start.get("character")?.as_u64()?).ok()?;

    let caption = match d.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Some(PublishedItem {
        line,
        character,
        severity: severity_from_lsp(d.get("severity").and_then(Value::as_u64)),
        caption,
        message: d
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    })
}

/// Latest diagnostics per file, in the order files were first reported.
#[derive(Debug, Default)]
pub struct DiagnosticsTable {
    order: Vec<String>,
    by_file: HashMap<String, Vec<Diagnostic>>,
}

impl DiagnosticsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list for `file`. Returns `false` if nothing changed.
    pub fn replace(&mut self, file: &str, diagnostics: Vec<Diagnostic>) -> bool {
        match self.by_file.get_mut(file) {
            Some(existing) if *existing == diagnostics => false,
            Some(existing) => {
                *existing = diagnostics;
                true
            }
            None => {
                if diagnostics.is_empty() {
                    return false;
                }
                self.order.push(file.to_string());
                self.by_file.insert(file.to_string(), diagnostics);
                true
            }
        }
    }

    /// Drop everything known about `file`. Returns `false` if there was nothing to drop.
    pub fn remove(&mut self, file: &str) -> bool {
        let had_any = self
            .by_file
            .remove(file)
            .is_some_and(|list| !list.is_empty());
        self.order.retain(|f| f != file);
        had_any
    }

    /// Current list for one file.
    pub fn for_file(&self, file: &str) -> &[Diagnostic] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Flatten every file into one snapshot.
    pub fn snapshot(&self) -> DiagnosticBatch {
        self.order
            .iter()
            .filter_map(|file| self.by_file.get(file))
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_maps_severity_and_code() {
        let params = json!({
            "uri": "file:///a.lean",
            "diagnostics": [
                {
                    "range": { "start": { "line": 3, "character": 2 }, "end": { "line": 3, "character": 9 } },
                    "severity": 1,
                    "code": "unsolvedGoals",
                    "message": "unsolved goals\n⊢ False",
                },
                {
                    "range": { "start": { "line": 0, "character": 0 }, "end": { "line": 0, "character": 1 } },
                    "severity": 4,
                    "code": 42,
                    "message": "hint",
                },
                { "severity": 2, "message": "no range" },
            ],
        });

        let (uri, items) = parse_publish_diagnostics(&params).unwrap();
        assert_eq!(uri, "file:///a.lean");
        assert_eq!(items.len(), 2);

        let d = items[0].clone().into_diagnostic("/a.lean", None);
        assert_eq!((d.line, d.column), (4, 2));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.header(), "4:2: error: unsolvedGoals");
        assert_eq!(d.text, "unsolved goals\n⊢ False");

        assert_eq!(items[1].severity, Severity::Information);
        assert_eq!(items[1].caption, "42");
    }

    #[test]
    fn test_column_counts_characters_when_text_is_known() {
        let item = PublishedItem {
            line: 1,
            character: 5,
            severity: Severity::Error,
            caption: String::new(),
            message: "unknown identifier".to_string(),
        };
        let text = "-- 👋\n👋👋x";
        assert_eq!(item.clone().into_diagnostic("/a.lean", Some(text)).column, 3);
        assert_eq!(item.into_diagnostic("/a.lean", None).column, 5);
    }

    #[test]
    fn test_out_of_range_positions_are_skipped() {
        let params = json!({
            "uri": "file:///a.lean",
            "diagnostics": [
                {
                    "range": { "start": { "line": 4294967296u64, "character": 0 }, "end": { "line": 0, "character": 0 } },
                    "message": "too far",
                },
                {
                    "range": { "start": { "line": 0, "character": 4294967296u64 }, "end": { "line": 0, "character": 0 } },
                    "message": "too wide",
                },
                {
                    "range": { "start": { "line": 4294967295u64, "character": 0 }, "end": { "line": 0, "character": 0 } },
                    "message": "last line",
                },
            ],
        });
        let (_, items) = parse_publish_diagnostics(&params).unwrap();
        let messages: Vec<&str> = items.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["last line"]);
        assert_eq!(items[0].clone().into_diagnostic("/a.lean", None).line, u32::MAX);
    }

    #[test]
    fn test_severity_table() {
        assert_eq!(severity_from_lsp(Some(1)), Severity::Error);
        assert_eq!(severity_from_lsp(Some(2)), Severity::Warning);
        assert_eq!(severity_from_lsp(Some(3)), Severity::Information);
        assert_eq!(severity_from_lsp(None), Severity::Error);
    }

    fn diag(file: &str, line: u32) -> Diagnostic {
        PublishedItem {
            line,
            character: 0,
            severity: Severity::Warning,
            caption: String::new(),
            message: format!("{file}:{line}"),
        }
        .into_diagnostic(file, None)
    }

    #[test]
    fn test_table_keeps_first_seen_order_and_replaces_per_file() {
        let mut table = DiagnosticsTable::new();
        assert!(table.replace("/b.lean", vec![diag("/b.lean", 0)]));
        assert!(table.replace("/a.lean", vec![diag("/a.lean", 0), diag("/a.lean", 1)]));
        assert!(table.replace("/b.lean", vec![diag("/b.lean", 5)]));
        assert!(!table.replace("/b.lean", vec![diag("/b.lean", 5)]));

        let texts: Vec<String> = table.snapshot().iter().map(|d| d.text.clone()).collect();
        assert_eq!(texts, vec!["/b.lean:5", "/a.lean:0", "/a.lean:1"]);

        assert!(table.replace("/a.lean", Vec::new()));
        assert_eq!(table.snapshot().len(), 1);
        assert!(table.for_file("/a.lean").is_empty());
    }

    #[test]
    fn test_empty_report_for_unknown_file_is_no_change() {
        let mut table = DiagnosticsTable::new();
        assert!(!table.replace("/a.lean", Vec::new()));
        assert!(!table.remove("/a.lean"));
    }
}
