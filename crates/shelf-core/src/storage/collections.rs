//! Named collections of records
//!
//! A collection is a top-level JSON array stored in `<name>.json`. The layer
//! is schema-agnostic: callers choose the record type, and a document that
//! does not decode as an array of that type is treated as an empty
//! collection (after being quarantined).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::Backend;

/// File name of the document backing a collection
pub fn document_name(name: &str) -> String {
    format!("{}.json", name)
}

/// Load/save access to whole collections
#[derive(Clone)]
pub struct Collections {
    backend: Arc<dyn Backend>,
}

impl Collections {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Load every record of a collection
    ///
    /// Returns an empty collection if the document is absent, blank, or not a
    /// well-formed array of `T`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> StorageResult<Vec<T>> {
        let records: Vec<T> = self.load_document(name)?;
        debug!(collection = name, records = records.len(), "loaded collection");
        Ok(records)
    }

    /// Replace a collection with the given records
    ///
    /// The document is pretty-printed and non-ASCII text is kept verbatim.
    pub fn save<T: Serialize>(&self, name: &str, records: &[T]) -> StorageResult<()> {
        self.save_document(name, records)?;
        debug!(collection = name, records = records.len(), "saved collection");
        Ok(())
    }

    /// Load the id counters
    pub fn load_sequences(&self) -> StorageResult<Sequences> {
        self.load_document(Sequences::DOCUMENT)
    }

    /// Persist the id counters
    pub fn save_sequences(&self, sequences: &Sequences) -> StorageResult<()> {
        self.save_document(Sequences::DOCUMENT, sequences)
    }

    fn load_document<T: DeserializeOwned + Default>(&self, name: &str) -> StorageResult<T> {
        let file = document_name(name);
        let Some(contents) = self.backend.read(&file)? else {
            return Ok(T::default());
        };

        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        match serde_json::from_str(&contents) {
            Ok(value) => Ok(value),
            Err(e) => {
                let backup = self.backend.quarantine(&file)?;
                warn!(
                    document = %file,
                    error = %e,
                    backup = backup.as_deref().unwrap_or("-"),
                    "malformed document, treating as empty"
                );
                Ok(T::default())
            }
        }
    }

    fn save_document<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
            name: name.to_string(),
            source,
        })?;
        self.backend.write(&document_name(name), &json)
    }
}

/// Last issued id per collection
///
/// Ids come from here rather than from the collection length, so deleting a
/// record never lets its id be handed out again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequences {
    last: BTreeMap<String, u64>,
}

impl Sequences {
    /// Name of the document holding the counters
    pub const DOCUMENT: &'static str = "sequences";

    /// Last id issued for a collection (0 if none)
    pub fn last(&self, collection: &str) -> u64 {
        self.last.get(collection).copied().unwrap_or(0)
    }

    /// Issue the next id for a collection
    ///
    /// `highest_existing` is the largest id currently stored, which covers
    /// documents written before the counter existed.
    pub fn next(&mut self, collection: &str, highest_existing: u64) -> u64 {
        let id = self.last(collection).max(highest_existing) + 1;
        self.last.insert(collection.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileBackend, MemoryBackend};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn memory() -> Collections {
        Collections::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_load_missing_is_empty() {
        let collections = memory();
        let records: Vec<Value> = collections.load("books").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_blank_is_empty() {
        let backend = MemoryBackend::new().with_document("books.json", "  \n");
        let collections = Collections::new(Arc::new(backend));
        let records: Vec<Value> = collections.load("books").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let backend = MemoryBackend::new().with_document("loans.json", r#"{"id": 1}"#);
        let collections = Collections::new(Arc::new(backend));
        let records: Vec<Value> = collections.load("loans").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_document_is_quarantined() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());
        backend.write("members.json", "[{\"id\": 1,").unwrap();

        let collections = Collections::new(Arc::new(backend.clone()));
        let records: Vec<Value> = collections.load("members").unwrap();

        assert!(records.is_empty());
        assert!(temp_dir.path().join("members.json.corrupt").exists());
    }

    #[test]
    fn test_save_load_is_fixed_point() {
        let collections = memory();
        let records = vec![
            json!({"id": 1, "title": "Bumi Manusia", "extra": {"nested": [1, 2]}}),
            json!({"id": 2, "title": "Café au lait", "status": "borrowed"}),
        ];

        collections.save("books", &records).unwrap();
        let first: Vec<Value> = collections.load("books").unwrap();
        collections.save("books", &first).unwrap();
        let second: Vec<Value> = collections.load("books").unwrap();

        assert_eq!(first, records);
        assert_eq!(second, first);
    }

    #[test]
    fn test_typed_records_survive_save_load() {
        use crate::models::{Book, Loan, Member};
        use chrono::{DateTime, TimeZone, Utc};

        let at = |day: u32, nanos: u32| -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 15).unwrap()
                + chrono::Duration::nanoseconds(nanos as i64)
        };

        let backend = Arc::new(MemoryBackend::new().with_document(
            "members.json",
            r#"[{"id": 3, "name": "Legacy", "email": "", "joinedAt": "2023-12-31T23:59:59Z"}]"#,
        ));
        let collections = Collections::new(backend.clone());

        let book = Book::new(1, "Café Ñandú", "Novel", at(1, 0));
        let other = Book::new(2, "Dune", "Fiksi", at(1, 123_456_789));
        let sari = Member::new(1, "Sari", Some("sari@example.com".into()), at(1, 500));
        let budi = Member::new(2, "Budi", None, at(2, 0));
        let open = Loan::open(1, &book, &sari, at(2, 42));
        let mut closed = Loan::open(2, &other, &budi, at(3, 0));
        closed.close(at(9, 7));

        // Legacy member with an empty email string reads back as "no email"
        let mut members: Vec<Member> = collections.load("members").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].email, None);
        members.push(sari);
        members.push(budi);

        let books = vec![book, other];
        let loans = vec![open, closed];
        collections.save("books", &books).unwrap();
        collections.save("members", &members).unwrap();
        collections.save("loans", &loans).unwrap();

        let raw_members = backend.read("members.json").unwrap().unwrap();
        let raw_loans = backend.read("loans.json").unwrap().unwrap();
        assert!(raw_members.contains(r#""email": null"#));
        assert!(!raw_members.contains(r#""email": """#));
        assert!(raw_loans.contains(r#""returnedAt": null"#));

        let loaded_books: Vec<Book> = collections.load("books").unwrap();
        let loaded_members: Vec<Member> = collections.load("members").unwrap();
        let loaded_loans: Vec<Loan> = collections.load("loans").unwrap();
        assert_eq!(loaded_books, books);
        assert_eq!(loaded_members, members);
        assert_eq!(loaded_loans, loans);

        // Saving what was loaded writes the same bytes again
        let raw_books = backend.read("books.json").unwrap().unwrap();
        collections.save("books", &loaded_books).unwrap();
        collections.save("members", &loaded_members).unwrap();
        collections.save("loans", &loaded_loans).unwrap();
        assert_eq!(backend.read("books.json").unwrap().unwrap(), raw_books);
        assert_eq!(backend.read("members.json").unwrap().unwrap(), raw_members);
        assert_eq!(backend.read("loans.json").unwrap().unwrap(), raw_loans);
    }

    #[test]
    fn test_save_is_pretty_and_keeps_unicode() {
        let backend = Arc::new(MemoryBackend::new());
        let collections = Collections::new(backend.clone());

        collections
            .save("members", &[json!({"name": "Zoë"})])
            .unwrap();

        let raw = backend.read("members.json").unwrap().unwrap();
        assert!(raw.contains("Zoë"));
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let mut sequences = Sequences::default();
        assert_eq!(sequences.next("books", 0), 1);
        assert_eq!(sequences.next("books", 0), 2);
        // A shrinking collection never rewinds the counter
        assert_eq!(sequences.next("books", 1), 3);
        // Existing data ahead of the counter moves it forward
        assert_eq!(sequences.next("loans", 7), 8);
        assert_eq!(sequences.last("members"), 0);
    }

    #[test]
    fn test_sequences_persist() {
        let collections = memory();
        let mut sequences = collections.load_sequences().unwrap();
        sequences.next("books", 0);
        sequences.next("books", 0);
        collections.save_sequences(&sequences).unwrap();

        let reloaded = collections.load_sequences().unwrap();
        assert_eq!(reloaded.last("books"), 2);
        assert_eq!(reloaded, sequences);
    }
}
