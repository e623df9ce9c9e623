//! JSON-RPC stdio framing.
//!
//! Messages are JSON values framed by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```

use crate::error::ClientError;
use serde_json::Value;
use std::io::{BufRead, Write};

/// Write a single framed message to `writer` and flush it.
pub fn write_message<W: Write>(writer: &mut W, value: &Value) -> Result<(), ClientError> {
    let body = serde_json::to_vec(value).map_err(|err| ClientError::Malformed(err.to_string()))?;

    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Read a single framed message from `reader`.
///
/// Returns `Ok(None)` on a clean EOF between messages. Unknown headers (such as
/// `Content-Type`) are skipped.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<Value>, ClientError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            if saw_header {
                return Err(ClientError::Closed("eof inside message header".to_string()));
            }
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            if !saw_header {
                continue;
            }
            break;
        }
        saw_header = true;

        if let Some((name, rest)) = trimmed.split_once(':')
            && name.trim().eq_ignore_ascii_case("Content-Length")
        {
            let parsed = rest.trim().parse::<usize>().map_err(|_| {
                ClientError::Malformed(format!("bad Content-Length `{}`", rest.trim()))
            })?;
            content_length = Some(parsed);
        }
    }

    let len = content_length
        .ok_or_else(|| ClientError::Malformed("missing Content-Length header".to_string()))?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;

    let value: Value =
        serde_json::from_slice(&body).map_err(|err| ClientError::Malformed(err.to_string()))?;
    Ok(Some(value))
}
