//! Loan command handlers

use anyhow::Result;
use chrono::Local;

use shelf_core::{Library, LoanStatus};

use crate::output::Output;

/// Lend a book to a member
pub fn borrow(library: &Library, book_id: u64, member_id: u64, output: &Output) -> Result<()> {
    let loan = library.borrow(book_id, member_id)?;

    output.success(&format!(
        "Book \"{}\" borrowed by {}. Due: {}",
        loan.book_title,
        loan.member_name,
        loan.due_at.with_timezone(&Local).format("%Y-%m-%d")
    ));
    output.print_loans(std::slice::from_ref(&loan), library.now())
}

/// Record the return of a loan
pub fn return_loan(library: &Library, loan_id: u64, output: &Output) -> Result<()> {
    let loan = library.return_loan(loan_id)?;

    let status = if loan.status == LoanStatus::ReturnedLate {
        "LATE"
    } else {
        "on time"
    };
    output.success(&format!("Return recorded. Status: {}", status));
    output.print_loans(std::slice::from_ref(&loan), library.now())
}

/// List loans: all, only open ones, or only overdue ones
pub fn list(library: &Library, open: bool, overdue: bool, output: &Output) -> Result<()> {
    let loans = if overdue {
        library.overdue_loans()?
    } else if open {
        library.open_loans()?
    } else {
        library.loans()?
    };

    output.print_loans(&loans, library.now())
}
