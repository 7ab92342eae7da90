//! Shelf Core Library
//!
//! This crate provides the core of shelf, a small record keeper for a lending
//! library: books, members and the loans between them.
//!
//! # Architecture
//!
//! - **Collections**: each kind of record is one JSON array, loaded in full,
//!   changed in memory and written back in full
//! - **Backend**: where documents live (a data directory, or memory in tests)
//! - **Library**: the facade every operation goes through
//!
//! # Quick Start
//!
//! ```text
//! let library = Library::open()?;
//!
//! let book = library.add_book("Laskar Pelangi", "Novel")?;
//! let member = library.add_member("Sari", None)?;
//! let loan = library.borrow(book.id, member.id)?;
//! library.return_loan(loan.id)?;
//! ```
//!
//! # Modules
//!
//! - `library`: the facade (main entry point)
//! - `catalog`, `roster`, `ledger`: book, member and loan operations
//! - `request`: request/response surface for front ends
//! - `models`: Book, Member and Loan
//! - `storage`: backends and collection persistence
//! - `activity`: the activity log
//! - `config`: application configuration

pub mod activity;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod library;
pub mod models;
pub mod request;
pub mod roster;
pub mod storage;

pub use activity::ActivityLog;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Entity, LibraryError, LibraryResult};
pub use library::{Library, Snapshot, Summary};
pub use models::{Book, BookStatus, Loan, LoanStatus, Member};
pub use request::{Outcome, Request};
pub use storage::{Backend, FileBackend, MemoryBackend, StorageError};
