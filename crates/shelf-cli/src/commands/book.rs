//! Book command handlers

use anyhow::Result;

use shelf_core::Library;

use crate::output::Output;
use crate::prompt::confirm;

/// Add a book to the catalog
pub fn add(library: &Library, title: String, category: String, output: &Output) -> Result<()> {
    let book = library.add_book(&title, &category)?;

    output.success(&format!("Book \"{}\" added.", book.title));
    output.print_book(&book)
}

/// Change a book's title and category
pub fn edit(
    library: &Library,
    id: u64,
    title: String,
    category: String,
    output: &Output,
) -> Result<()> {
    let book = library.edit_book(id, &title, &category)?;

    output.success("Book updated.");
    output.print_book(&book)
}

/// Delete a book that is not lent out
pub fn delete(library: &Library, id: u64, yes: bool, output: &Output) -> Result<()> {
    let book = library.book(id)?;

    if !yes && output.should_prompt() {
        println!("Delete book: {} - {}", book.id, book.title);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    library.delete_book(id)?;
    output.success("Book deleted.");
    Ok(())
}

/// List books, optionally only the ones on the shelf
pub fn list(library: &Library, available: bool, output: &Output) -> Result<()> {
    let books = if available {
        library.available_books()?
    } else {
        library.books()?
    };

    output.print_books(&books)
}

/// Show a single book
pub fn show(library: &Library, id: u64, output: &Output) -> Result<()> {
    let book = library.book(id)?;
    output.print_book(&book)
}
