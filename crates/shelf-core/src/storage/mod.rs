//! Storage layer
//!
//! Every collection lives in its own JSON document and is always read and
//! written in full. The business logic never touches files directly; it goes
//! through [`Collections`], which sits on top of an injected [`Backend`]:
//!
//! - [`FileBackend`]: documents under the configured data directory, written
//!   atomically (temp file, fsync, rename)
//! - [`MemoryBackend`]: documents in a map, for tests and embedding

pub mod collections;
pub mod error;
pub mod memory;
pub mod persistence;

pub use collections::{Collections, Sequences};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use persistence::FileBackend;

/// Raw document access used by the collection layer and the activity log.
///
/// Documents are addressed by file name (`books.json`, `log.txt`, ...).
pub trait Backend: Send + Sync {
    /// Read a whole document. Returns `None` if it does not exist.
    fn read(&self, file: &str) -> StorageResult<Option<String>>;

    /// Replace a whole document. Readers never observe a partial write.
    fn write(&self, file: &str, contents: &str) -> StorageResult<()>;

    /// Append a single line, creating the document if needed.
    fn append(&self, file: &str, line: &str) -> StorageResult<()>;

    /// Set a malformed document aside so a later write cannot destroy it.
    ///
    /// Returns the name it was copied to, if the backend keeps one.
    fn quarantine(&self, file: &str) -> StorageResult<Option<String>>;
}
