//! The library facade
//!
//! `Library` owns the storage, the clock and the activity log. The catalog,
//! roster and ledger operations are implemented as methods on it in their own
//! modules.
//!
//! ## Write cycle
//!
//! Every mutation reloads the collections it touches, changes them in memory,
//! writes them back in full and then appends to the activity log. The whole
//! cycle runs under one lock, so threads sharing a `Library` never lose each
//! other's updates. Separate processes writing the same data directory are
//! not coordinated: the last document written wins.
//!
//! ## Usage
//!
//! ```ignore
//! let library = Library::open()?;
//!
//! let book = library.add_book("Laskar Pelangi", "Novel")?;
//! let member = library.add_member("Sari", None)?;
//! let loan = library.borrow(book.id, member.id)?;
//! library.return_loan(loan.id)?;
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::activity::ActivityLog;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::LibraryResult;
use crate::models::{Book, BookStatus, Loan, Member};
use crate::storage::{Backend, Collections, FileBackend, MemoryBackend, Sequences};

/// Collection names
pub const BOOKS: &str = "books";
pub const MEMBERS: &str = "members";
pub const LOANS: &str = "loans";

/// Books, members and loans behind one store
pub struct Library {
    collections: Collections,
    activity: ActivityLog,
    clock: Arc<dyn Clock>,
    writes: Mutex<()>,
}

impl Library {
    /// Open the library described by the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(&config))
    }

    /// Open the library stored in the configured data directory
    pub fn open_with_config(config: &Config) -> Self {
        Self::with_backend(
            Arc::new(FileBackend::from_config(config)),
            Arc::new(SystemClock),
        )
    }

    /// A library that lives only in memory
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), Arc::new(SystemClock))
    }

    /// Build a library over any backend and clock
    pub fn with_backend(backend: Arc<dyn Backend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            collections: Collections::new(backend.clone()),
            activity: ActivityLog::new(backend),
            clock,
            writes: Mutex::new(()),
        }
    }

    /// Current time according to the library's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The activity log
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    // ==================== Queries ====================

    /// All books, in insertion order
    pub fn books(&self) -> LibraryResult<Vec<Book>> {
        Ok(self.collections.load(BOOKS)?)
    }

    /// All members, in insertion order
    pub fn members(&self) -> LibraryResult<Vec<Member>> {
        Ok(self.collections.load(MEMBERS)?)
    }

    /// All loans, open and closed, in insertion order
    pub fn loans(&self) -> LibraryResult<Vec<Loan>> {
        Ok(self.collections.load(LOANS)?)
    }

    /// Counts shown on status screens
    pub fn summary(&self) -> LibraryResult<Summary> {
        let now = self.now();
        let books = self.books()?;
        let loans = self.loans()?;

        Ok(Summary {
            books: books.len(),
            available_books: books
                .iter()
                .filter(|b| b.status == BookStatus::Available)
                .count(),
            members: self.members()?.len(),
            loans: loans.len(),
            open_loans: loans.iter().filter(|l| l.is_open()).count(),
            overdue_loans: loans.iter().filter(|l| l.is_overdue(now)).count(),
        })
    }

    /// Everything the library holds, for diagnostics
    pub fn snapshot(&self) -> LibraryResult<Snapshot> {
        Ok(Snapshot {
            taken_at: self.now(),
            books: self.books()?,
            members: self.members()?,
            loans: self.loans()?,
            sequences: self.collections.load_sequences()?,
            activity: self.activity.entries()?,
        })
    }

    // ==================== Write plumbing ====================

    pub(crate) fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Hold this for the whole load-modify-save cycle of a mutation
    pub(crate) fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the next id for a collection and persist the counter
    pub(crate) fn issue_id(&self, collection: &str, highest_existing: u64) -> LibraryResult<u64> {
        let mut sequences = self.collections.load_sequences()?;
        let id = sequences.next(collection, highest_existing);
        self.collections.save_sequences(&sequences)?;
        Ok(id)
    }

    /// Save two collections that change together
    ///
    /// If the second save fails, the first collection is written back as it
    /// was, so a failed operation leaves both documents unchanged.
    pub(crate) fn save_both<A: Serialize, B: Serialize>(
        &self,
        first: (&str, &[A], &[A]),
        second: (&str, &[B]),
    ) -> LibraryResult<()> {
        let (first_name, first_records, first_before) = first;
        let (second_name, second_records) = second;

        self.collections.save(first_name, first_records)?;
        if let Err(e) = self.collections.save(second_name, second_records) {
            if let Err(rollback) = self.collections.save(first_name, first_before) {
                warn!(
                    collection = first_name,
                    error = %rollback,
                    "could not roll back after a failed save"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub(crate) fn record(&self, at: DateTime<Utc>, message: &str) {
        self.activity.record(at, message);
    }
}

/// Largest id in a collection (0 when empty)
pub(crate) fn highest_id<T>(records: &[T], id: impl Fn(&T) -> u64) -> u64 {
    records.iter().map(id).max().unwrap_or(0)
}

/// Collection counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub books: usize,
    pub available_books: usize,
    pub members: usize,
    pub loans: usize,
    pub open_loans: usize,
    pub overdue_loans: usize,
}

/// Full dump of the stored state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
    pub sequences: Sequences,
    pub activity: Vec<String>,
}
