//! Atomic file operations for crash-safe persistence.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Writes data to a file atomically: a temp file in the target directory is
/// filled, flushed, and renamed over the destination, so readers never see a
/// partially written file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::DirectoryError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Temp file in the same directory keeps the rename on one filesystem.
    let dir = path.parent().unwrap_or(Path::new("."));
    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(data).map_err(write_err)?;
    temp.flush().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Serializes a value as pretty JSON and writes it atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes JSON, `None` when the file does not exist.
pub fn read_json_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(serde_json::from_str(&data)?))
}

/// Removes a file if it exists.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|source| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
