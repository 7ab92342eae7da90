//! Lending ledger
//!
//! Drives the two state machines:
//!
//! ```text
//! book:  available --borrow--> borrowed --return--> available
//! loan:  borrowed  --return--> returned | returned-late
//! ```
//!
//! A book is `borrowed` exactly while one open loan points at it.

use tracing::{info, warn};

use crate::error::{Entity, LibraryError, LibraryResult};
use crate::library::{highest_id, Library, BOOKS, LOANS, MEMBERS};
use crate::models::{Book, BookStatus, Loan, LoanStatus, Member};

impl Library {
    /// Lend a book to a member
    ///
    /// The loan is due one loan period after now.
    pub fn borrow(&self, book_id: u64, member_id: u64) -> LibraryResult<Loan> {
        let mut problems = Vec::new();
        if book_id == 0 {
            problems.push("Book id is required.".to_string());
        }
        if member_id == 0 {
            problems.push("Member id is required.".to_string());
        }
        if !problems.is_empty() {
            return Err(LibraryError::Validation(problems));
        }

        let _guard = self.lock_writes();
        let now = self.now();
        let mut books: Vec<Book> = self.collections().load(BOOKS)?;
        let members: Vec<Member> = self.collections().load(MEMBERS)?;
        let mut loans: Vec<Loan> = self.collections().load(LOANS)?;

        let book = books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| LibraryError::not_found(Entity::Book, book_id))?;
        let member = members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or_else(|| LibraryError::not_found(Entity::Member, member_id))?;
        if book.status != BookStatus::Available {
            return Err(LibraryError::Conflict(format!(
                "Book #{} is not available (status: {}).",
                book_id, book.status
            )));
        }

        let id = self.issue_id(LOANS, highest_id(&loans, |l| l.id))?;
        let loan = Loan::open(id, book, member, now);
        book.status = BookStatus::Borrowed;
        let loans_before = loans.clone();
        loans.push(loan.clone());

        self.save_both((LOANS, &loans[..], &loans_before[..]), (BOOKS, &books[..]))?;

        info!(loan_id = loan.id, book_id, member_id, due_at = %loan.due_at, "book borrowed");
        self.record(
            now,
            &format!("Borrow: Book[{}] by Member[{}]", book_id, member_id),
        );
        Ok(loan)
    }

    /// Close a loan and put its book back on the shelf
    ///
    /// A return strictly after the due date is late. If the book has been
    /// deleted in the meantime the return is still recorded; there is just no
    /// book left to mark available.
    pub fn return_loan(&self, loan_id: u64) -> LibraryResult<Loan> {
        if loan_id == 0 {
            return Err(LibraryError::validation("Loan id is required."));
        }

        let _guard = self.lock_writes();
        let now = self.now();
        let mut loans: Vec<Loan> = self.collections().load(LOANS)?;
        let mut books: Vec<Book> = self.collections().load(BOOKS)?;
        let loans_before = loans.clone();

        let loan = loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(|| LibraryError::not_found(Entity::Loan, loan_id))?;
        if !loan.is_open() {
            return Err(LibraryError::Conflict(format!(
                "Loan #{} has already been returned.",
                loan_id
            )));
        }

        let status = loan.close(now);
        let loan = loan.clone();

        match books.iter_mut().find(|b| b.id == loan.book_id) {
            Some(book) => book.status = BookStatus::Available,
            None => warn!(
                loan_id,
                book_id = loan.book_id,
                "returned loan refers to a book that no longer exists"
            ),
        }

        self.save_both((LOANS, &loans[..], &loans_before[..]), (BOOKS, &books[..]))?;

        let marker = if status == LoanStatus::ReturnedLate {
            "LATE"
        } else {
            "ON TIME"
        };
        info!(loan_id, book_id = loan.book_id, %status, "book returned");
        self.record(
            now,
            &format!(
                "Return: Loan[{}] - Book[{}] by Member[{}] - {}",
                loan_id, loan.book_id, loan.member_id, marker
            ),
        );
        Ok(loan)
    }

    /// Empty the activity log
    pub fn clear_log(&self) -> LibraryResult<()> {
        let _guard = self.lock_writes();
        self.activity().clear()?;
        info!("activity log cleared");
        Ok(())
    }

    /// Look up one loan
    pub fn loan(&self, id: u64) -> LibraryResult<Loan> {
        self.loans()?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| LibraryError::not_found(Entity::Loan, id))
    }

    /// Loans not yet returned
    pub fn open_loans(&self) -> LibraryResult<Vec<Loan>> {
        Ok(self.loans()?.into_iter().filter(Loan::is_open).collect())
    }

    /// Open loans whose due date has passed
    pub fn overdue_loans(&self) -> LibraryResult<Vec<Loan>> {
        let now = self.now();
        Ok(self
            .loans()?
            .into_iter()
            .filter(|l| l.is_overdue(now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::storage::{Backend, MemoryBackend, StorageError, StorageResult};
    use chrono::{Duration, TimeZone, Utc};
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory backend whose `books.json` writes fail while `broken` is set
    #[derive(Default)]
    struct BrittleBooks {
        inner: MemoryBackend,
        broken: AtomicBool,
    }

    impl BrittleBooks {
        fn set_broken(&self, broken: bool) {
            self.broken.store(broken, Ordering::SeqCst);
        }
    }

    impl Backend for BrittleBooks {
        fn read(&self, file: &str) -> StorageResult<Option<String>> {
            self.inner.read(file)
        }

        fn write(&self, file: &str, contents: &str) -> StorageResult<()> {
            if file == "books.json" && self.broken.load(Ordering::SeqCst) {
                return Err(StorageError::from_write(
                    io::Error::new(io::ErrorKind::Other, "device went away"),
                    PathBuf::from(file),
                ));
            }
            self.inner.write(file, contents)
        }

        fn append(&self, file: &str, line: &str) -> StorageResult<()> {
            self.inner.append(file, line)
        }

        fn quarantine(&self, file: &str) -> StorageResult<Option<String>> {
            self.inner.quarantine(file)
        }
    }

    fn library_at(clock: &Arc<ManualClock>) -> Library {
        Library::with_backend(Arc::new(MemoryBackend::new()), clock.clone())
    }

    fn start() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_borrow_marks_book_borrowed() {
        let clock = start();
        let library = library_at(&clock);
        let book = library.add_book("Laskar Pelangi", "Novel").unwrap();
        let member = library.add_member("Sari", None).unwrap();

        let loan = library.borrow(book.id, member.id).unwrap();

        assert_eq!(loan.id, 1);
        assert_eq!(loan.status, LoanStatus::Borrowed);
        assert_eq!(loan.borrowed_at, clock.now());
        assert_eq!(loan.due_at, clock.now() + Duration::days(3));
        assert_eq!(loan.book_title, "Laskar Pelangi");
        assert_eq!(loan.member_name, "Sari");
        assert_eq!(library.book(book.id).unwrap().status, BookStatus::Borrowed);
        assert_eq!(library.open_loans().unwrap(), vec![loan]);
    }

    #[test]
    fn test_second_borrow_conflicts() {
        let clock = start();
        let library = library_at(&clock);
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let a = library.add_member("A", None).unwrap();
        let b = library.add_member("B", None).unwrap();

        library.borrow(book.id, a.id).unwrap();
        let err = library.borrow(book.id, b.id).unwrap_err();

        assert!(matches!(err, LibraryError::Conflict(_)));
        assert_eq!(library.loans().unwrap().len(), 1);
    }

    #[test]
    fn test_borrow_validation() {
        let library = Library::in_memory();
        match library.borrow(0, 0).unwrap_err() {
            LibraryError::Validation(problems) => assert_eq!(problems.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_borrow_unknown_book_or_member() {
        let library = Library::in_memory();
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let member = library.add_member("Sari", None).unwrap();

        assert!(matches!(
            library.borrow(99, member.id),
            Err(LibraryError::NotFound {
                entity: Entity::Book,
                id: 99
            })
        ));
        assert!(matches!(
            library.borrow(book.id, 99),
            Err(LibraryError::NotFound {
                entity: Entity::Member,
                id: 99
            })
        ));
        assert!(library.loans().unwrap().is_empty());
        assert!(library.book(book.id).unwrap().is_available());
    }

    #[test]
    fn test_return_on_time() {
        let clock = start();
        let library = library_at(&clock);
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let member = library.add_member("Sari", None).unwrap();
        let loan = library.borrow(book.id, member.id).unwrap();

        // Exactly at the deadline still counts as on time
        clock.advance(Duration::days(3));
        let returned = library.return_loan(loan.id).unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.returned_at, Some(clock.now()));
        assert!(library.book(book.id).unwrap().is_available());

        let entries = library.activity().entries().unwrap();
        assert!(entries
            .last()
            .unwrap()
            .ends_with("Return: Loan[1] - Book[1] by Member[1] - ON TIME"));
    }

    #[test]
    fn test_return_late() {
        let clock = start();
        let library = library_at(&clock);
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let member = library.add_member("Sari", None).unwrap();
        let loan = library.borrow(book.id, member.id).unwrap();

        clock.advance(Duration::days(3) + Duration::seconds(1));
        assert_eq!(library.overdue_loans().unwrap().len(), 1);

        let returned = library.return_loan(loan.id).unwrap();
        assert_eq!(returned.status, LoanStatus::ReturnedLate);
        assert!(library.overdue_loans().unwrap().is_empty());

        let entries = library.activity().entries().unwrap();
        assert!(entries.last().unwrap().ends_with("- LATE"));
    }

    #[test]
    fn test_return_twice_conflicts() {
        let clock = start();
        let library = library_at(&clock);
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let member = library.add_member("Sari", None).unwrap();
        let loan = library.borrow(book.id, member.id).unwrap();

        let first = library.return_loan(loan.id).unwrap();
        clock.advance(Duration::days(10));
        let err = library.return_loan(loan.id).unwrap_err();

        assert!(matches!(err, LibraryError::Conflict(_)));
        assert_eq!(library.loan(loan.id).unwrap().returned_at, first.returned_at);
    }

    #[test]
    fn test_return_validation_and_not_found() {
        let library = Library::in_memory();
        assert!(matches!(
            library.return_loan(0),
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            library.return_loan(5),
            Err(LibraryError::NotFound {
                entity: Entity::Loan,
                id: 5
            })
        ));
    }

    #[test]
    fn test_return_after_book_vanished() {
        let clock = start();
        let backend = Arc::new(MemoryBackend::new());
        let library = Library::with_backend(backend.clone(), clock.clone());
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let member = library.add_member("Sari", None).unwrap();
        let loan = library.borrow(book.id, member.id).unwrap();

        // Another tool removed the book behind the library's back
        backend.write("books.json", "[]").unwrap();

        let returned = library.return_loan(loan.id).unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert!(library.books().unwrap().is_empty());
    }

    #[test]
    fn test_failed_borrow_leaves_no_open_loan() {
        let backend = Arc::new(BrittleBooks::default());
        let library = Library::with_backend(backend.clone(), start());
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let sari = library.add_member("Sari", None).unwrap();
        let budi = library.add_member("Budi", None).unwrap();

        backend.set_broken(true);
        let err = library.borrow(book.id, sari.id).unwrap_err();
        assert!(matches!(err, LibraryError::Storage(_)));

        assert!(library.loans().unwrap().is_empty());
        assert!(library.book(book.id).unwrap().is_available());

        backend.set_broken(false);
        let loan = library.borrow(book.id, sari.id).unwrap();
        assert!(matches!(
            library.borrow(book.id, budi.id),
            Err(LibraryError::Conflict(_))
        ));

        let open: Vec<Loan> = library
            .open_loans()
            .unwrap()
            .into_iter()
            .filter(|l| l.book_id == book.id)
            .collect();
        assert_eq!(open, vec![loan]);
        assert_eq!(library.book(book.id).unwrap().status, BookStatus::Borrowed);
    }

    #[test]
    fn test_failed_return_keeps_loan_open() {
        let backend = Arc::new(BrittleBooks::default());
        let library = Library::with_backend(backend.clone(), start());
        let book = library.add_book("Dune", "Fiksi").unwrap();
        let member = library.add_member("Sari", None).unwrap();
        let loan = library.borrow(book.id, member.id).unwrap();

        backend.set_broken(true);
        assert!(matches!(
            library.return_loan(loan.id),
            Err(LibraryError::Storage(_))
        ));

        let stored = library.loan(loan.id).unwrap();
        assert!(stored.is_open());
        assert!(stored.returned_at.is_none());
        assert_eq!(library.book(book.id).unwrap().status, BookStatus::Borrowed);

        backend.set_broken(false);
        let returned = library.return_loan(loan.id).unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert!(library.book(book.id).unwrap().is_available());
    }

    #[test]
    fn test_clear_log() {
        let library = Library::in_memory();
        library.add_book("Dune", "Fiksi").unwrap();
        assert_eq!(library.activity().entries().unwrap().len(), 1);

        library.clear_log().unwrap();
        assert!(library.activity().entries().unwrap().is_empty());
    }
}
