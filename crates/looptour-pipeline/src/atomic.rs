//! Replace files without ever exposing a half-written version.

use std::io::{self, Write};
use std::path::Path;

/// Write `contents` to `path` via a temporary sibling file that is renamed
/// into place once fully written and flushed.
///
/// If anything fails the temporary file is removed and `path` keeps its
/// previous contents (or stays absent).
///
/// # Errors
///
/// Returns the underlying I/O error if the temporary file cannot be
/// created, written, synced, or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
