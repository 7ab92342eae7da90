//! Storage errors
//!
//! I/O failures are classified by cause so front ends can tell the user what
//! to do about them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied on '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left to write '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A collection could not be turned into JSON
    #[error("Cannot encode collection '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The finished temp file could not replace the document
    #[error("Cannot replace '{to}' with '{from}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Wrap a failed read of `path`
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return StorageError::PermissionDenied {
                path,
                source: error,
            };
        }
        StorageError::ReadError {
            path,
            source: error,
        }
    }

    /// Wrap a failed write of `path`
    pub fn from_write(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied {
                path,
                source: error,
            }
        } else if is_disk_full_error(&error) {
            StorageError::DiskFull {
                path,
                source: error,
            }
        } else {
            StorageError::WriteError {
                path,
                source: error,
            }
        }
    }

    /// Whether the user can fix the cause and simply retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::CreateDirectory { .. }
        )
    }

    /// What the user can do about it, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check the permissions of the data directory and its files.")
            }
            StorageError::CreateDirectory { .. } => Some(
                "Point data_dir at a writable location: shelf config set data_dir <path>",
            ),
            _ => None,
        }
    }
}

/// `ErrorKind::StorageFull` is not available on every supported toolchain,
/// so the OS message is inspected instead
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err(kind: io::ErrorKind, msg: &str) -> io::Error {
        io::Error::new(kind, msg)
    }

    #[test]
    fn test_write_classification() {
        let path = PathBuf::from("/data/books.json");

        let denied = StorageError::from_write(
            io_err(io::ErrorKind::PermissionDenied, "access denied"),
            path.clone(),
        );
        assert!(matches!(denied, StorageError::PermissionDenied { .. }));

        let full = StorageError::from_write(
            io_err(io::ErrorKind::Other, "No space left on device"),
            path.clone(),
        );
        assert!(matches!(full, StorageError::DiskFull { .. }));

        let other = StorageError::from_write(io_err(io::ErrorKind::Other, "boom"), path);
        assert!(matches!(other, StorageError::WriteError { .. }));
        assert!(!other.is_recoverable());
        assert!(other.recovery_suggestion().is_none());
    }

    #[test]
    fn test_read_classification() {
        let err = StorageError::from_read(
            io_err(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
            PathBuf::from("/data/loans.json"),
        );
        assert!(matches!(err, StorageError::ReadError { .. }));

        let err = StorageError::from_read(
            io_err(io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("/data/loans.json"),
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_suggestions_for_recoverable_errors() {
        let err = StorageError::CreateDirectory {
            path: PathBuf::from("/readonly/shelf"),
            source: io_err(io::ErrorKind::Other, "read-only file system"),
        };
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().unwrap().contains("data_dir"));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::PermissionDenied {
            path: PathBuf::from("/data/members.json"),
            source: io_err(io::ErrorKind::PermissionDenied, "denied"),
        };

        let msg = err.to_string();
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("/data/members.json"));
    }
}
