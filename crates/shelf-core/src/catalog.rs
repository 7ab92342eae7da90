//! Catalog operations (books)

use tracing::info;

use crate::error::{Entity, LibraryError, LibraryResult};
use crate::library::{highest_id, Library, BOOKS};
use crate::models::{Book, BookStatus};

/// Problems with the fields every book needs
fn book_field_problems(title: &str, category: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if title.trim().is_empty() {
        problems.push("Title is required.".to_string());
    }
    if category.trim().is_empty() {
        problems.push("Category is required.".to_string());
    }
    problems
}

impl Library {
    /// Add a book to the catalog
    pub fn add_book(&self, title: &str, category: &str) -> LibraryResult<Book> {
        let problems = book_field_problems(title, category);
        if !problems.is_empty() {
            return Err(LibraryError::Validation(problems));
        }
        let (title, category) = (title.trim(), category.trim());

        let _guard = self.lock_writes();
        let now = self.now();
        let mut books: Vec<Book> = self.collections().load(BOOKS)?;

        let id = self.issue_id(BOOKS, highest_id(&books, |b| b.id))?;
        let book = Book::new(id, title, category, now);
        books.push(book.clone());
        self.collections().save(BOOKS, &books)?;

        info!(book_id = book.id, slug = %book.slug, "book added");
        self.record(
            now,
            &format!("Add book: {} (category: {})", book.title, book.category),
        );
        Ok(book)
    }

    /// Change a book's title and category
    ///
    /// The derived fields are recomputed; the lending status is untouched.
    pub fn edit_book(&self, id: u64, title: &str, category: &str) -> LibraryResult<Book> {
        let mut problems = Vec::new();
        if id == 0 {
            problems.push("Book id is required.".to_string());
        }
        problems.extend(book_field_problems(title, category));
        if !problems.is_empty() {
            return Err(LibraryError::Validation(problems));
        }
        let (title, category) = (title.trim(), category.trim());

        let _guard = self.lock_writes();
        let now = self.now();
        let mut books: Vec<Book> = self.collections().load(BOOKS)?;

        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| LibraryError::not_found(Entity::Book, id))?;
        book.retitle(title, category);
        let book = book.clone();
        self.collections().save(BOOKS, &books)?;

        info!(book_id = id, "book edited");
        self.record(now, &format!("Edit book: {} - {}", id, book.title));
        Ok(book)
    }

    /// Remove a book that is not currently lent out
    pub fn delete_book(&self, id: u64) -> LibraryResult<Book> {
        if id == 0 {
            return Err(LibraryError::validation("Book id is required."));
        }

        let _guard = self.lock_writes();
        let now = self.now();
        let mut books: Vec<Book> = self.collections().load(BOOKS)?;

        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| LibraryError::not_found(Entity::Book, id))?;
        if books[pos].status != BookStatus::Available {
            return Err(LibraryError::Conflict(format!(
                "Book #{} is {} and cannot be deleted.",
                id, books[pos].status
            )));
        }

        let book = books.remove(pos);
        self.collections().save(BOOKS, &books)?;

        info!(book_id = id, "book deleted");
        self.record(now, &format!("Delete book: {} - {}", id, book.title));
        Ok(book)
    }

    /// Look up one book
    pub fn book(&self, id: u64) -> LibraryResult<Book> {
        self.books()?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| LibraryError::not_found(Entity::Book, id))
    }

    /// Books that can be borrowed right now
    pub fn available_books(&self) -> LibraryResult<Vec<Book>> {
        Ok(self
            .books()?
            .into_iter()
            .filter(Book::is_available)
            .collect())
    }
}
