// src/db.rs

//! Database file bootstrap.
//!
//! The API creates its tables on startup; all that is needed beforehand is
//! that the file exists.

use std::path::Path;

use tracing::debug;

use crate::errors::{LauncherError, Result};
use crate::fs::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseFile {
    Existing,
    Created,
}

/// Create `path` as an empty file unless something is already there.
pub fn ensure_database_file(fs: &dyn FileSystem, path: &Path) -> Result<DatabaseFile> {
    if fs.exists(path) {
        debug!(path = %path.display(), "database file already present");
        return Ok(DatabaseFile::Existing);
    }

    fs.write(path, b"").map_err(|e| {
        LauncherError::Other(e.context(format!("creating database file {}", path.display())))
    })?;
    Ok(DatabaseFile::Created)
}
