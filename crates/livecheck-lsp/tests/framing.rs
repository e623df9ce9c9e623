use livecheck_lsp::{read_message, write_message};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Cursor;

#[test]
fn test_write_then_read_back_to_back_messages() {
    let first = json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} });
    let second = json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didOpen",
        "params": { "textDocument": { "text": "example (m n : ℕ) : m + n = n + m" } },
    });

    let mut buf = Vec::new();
    write_message(&mut buf, &first).unwrap();
    write_message(&mut buf, &second).unwrap();

    let mut reader = Cursor::new(buf);
    assert_eq!(read_message(&mut reader).unwrap(), Some(first));
    assert_eq!(read_message(&mut reader).unwrap(), Some(second));
    assert_eq!(read_message(&mut reader).unwrap(), None);
}

#[test]
fn test_content_length_counts_bytes_not_chars() {
    let value = json!({ "goal": "⊢ ℕ" });
    let mut buf = Vec::new();
    write_message(&mut buf, &value).unwrap();

    let text = String::from_utf8(buf).unwrap();
    let (header, body) = text.split_once("\r\n\r\n").unwrap();
    assert_eq!(header, format!("Content-Length: {}", body.len()));
    assert!(body.len() > body.chars().count());
}
