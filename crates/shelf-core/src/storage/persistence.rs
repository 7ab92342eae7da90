//! File-backed document persistence
//!
//! Handles saving and loading documents to/from the filesystem.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/shelf/` (configurable via `Config`)
//!
//! Files:
//! - `books.json`, `members.json`, `loans.json` - one array per collection
//! - `sequences.json` - last issued id per collection
//! - `log.txt` - append-only activity log

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::Backend;
use crate::config::Config;

/// Backend storing each document as a file in one directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a backend rooted at the configured data directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// Full path of a document
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

impl Backend for FileBackend {
    fn read(&self, file: &str) -> StorageResult<Option<String>> {
        let path = self.path_of(file);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), bytes = contents.len(), "read document");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_read(e, path)),
        }
    }

    fn write(&self, file: &str, contents: &str) -> StorageResult<()> {
        let path = self.path_of(file);
        atomic_write(&path, contents.as_bytes())?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote document");
        Ok(())
    }

    fn append(&self, file: &str, line: &str) -> StorageResult<()> {
        let path = self.path_of(file);
        ensure_parent(&path)?;
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::from_write(e, path.clone()))?;
        writeln!(handle, "{}", line).map_err(|e| StorageError::from_write(e, path))
    }

    fn quarantine(&self, file: &str) -> StorageResult<Option<String>> {
        let backup = format!("{}.corrupt", file);
        let from = self.path_of(file);
        let to = self.path_of(&backup);
        fs::copy(&from, &to).map_err(|e| StorageError::from_write(e, to))?;
        Ok(Some(backup))
    }
}

fn ensure_parent(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file over the target path
///
/// The target is never left partially written, and concurrent writers each
/// get their own temp file. A temp file that is never persisted is removed
/// when dropped.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    ensure_parent(path)?;

    // Same directory so the rename stays on one filesystem
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| StorageError::from_write(e, dir.to_path_buf()))?;

    temp.write_all(data)
        .map_err(|e| StorageError::from_write(e, temp.path().to_path_buf()))?;

    // Sync to disk before rename
    temp.as_file()
        .sync_all()
        .map_err(|e| StorageError::from_write(e, temp.path().to_path_buf()))?;

    temp.persist(path)
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: e.file.path().to_path_buf(),
            to: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}
