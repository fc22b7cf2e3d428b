// 💾 Durable file helpers
// Whole-file writes go through a temp file in the target directory, then rename over the target.

use crate::error::StoreError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Serialize `value` as JSON indented with four spaces
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Replace the contents of `path` with `contents`.
///
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::storage(path, e))?;
    tmp.write_all(contents)
        .map_err(|e| StoreError::storage(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::storage(path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::storage(path, e.error))?;

    Ok(())
}
