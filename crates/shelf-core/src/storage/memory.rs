//! In-memory backend

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::StorageResult;
use super::Backend;

/// Backend keeping every document in a map
///
/// Nothing survives the process. Quarantined documents are dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, e.g. with content written by another tool
    pub fn with_document(self, file: &str, contents: &str) -> Self {
        self.documents().insert(file.to_string(), contents.to_string());
        self
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn read(&self, file: &str) -> StorageResult<Option<String>> {
        Ok(self.documents().get(file).cloned())
    }

    fn write(&self, file: &str, contents: &str) -> StorageResult<()> {
        self.documents()
            .insert(file.to_string(), contents.to_string());
        Ok(())
    }

    fn append(&self, file: &str, line: &str) -> StorageResult<()> {
        let mut documents = self.documents();
        let doc = documents.entry(file.to_string()).or_default();
        doc.push_str(line);
        doc.push('\n');
        Ok(())
    }

    fn quarantine(&self, _file: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }
}
