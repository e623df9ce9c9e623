//! Path/URI conversion for `textDocument.uri`.

use std::path::{Path, PathBuf};
use url::Url;

/// Convert a file path into a `file://` URI.
///
/// Relative paths are resolved against the current directory. Paths `url` cannot represent
/// fall back to a plain `file://` prefix.
pub fn path_to_uri(path: &str) -> String {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    match Url::from_file_path(&absolute) {
        Ok(url) => url.to_string(),
        Err(()) => format!("file://{}", absolute.to_string_lossy()),
    }
}

/// Convert a `file://` URI back into a path. Returns `None` for other schemes.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    let url = Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}
