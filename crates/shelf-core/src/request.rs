//! Request/response surface
//!
//! Front ends hand the library one `Request` per user action and show the
//! resulting `Outcome`: a confirmation line on success, or every problem found
//! on failure.
//!
//! Requests are JSON objects tagged by `action`:
//!
//! ```json
//! {"action": "borrow", "bookId": 1, "memberId": 1}
//! ```
//!
//! A missing id reads as `0`, which every operation rejects as required.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::library::Library;
use crate::models::LoanStatus;

/// One user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    AddBook {
        #[serde(default)]
        title: String,
        #[serde(default)]
        category: String,
    },
    EditBook {
        #[serde(default)]
        id: u64,
        #[serde(default)]
        title: String,
        #[serde(default)]
        category: String,
    },
    DeleteBook {
        #[serde(default)]
        id: u64,
    },
    AddMember {
        #[serde(default)]
        name: String,
        #[serde(default)]
        email: Option<String>,
    },
    Borrow {
        #[serde(default, rename = "bookId")]
        book_id: u64,
        #[serde(default, rename = "memberId")]
        member_id: u64,
    },
    Return {
        #[serde(default, rename = "loanId")]
        loan_id: u64,
    },
    ClearLogs {},
}

impl Request {
    /// The `action` tag of this request
    pub fn action(&self) -> &'static str {
        match self {
            Request::AddBook { .. } => "add_book",
            Request::EditBook { .. } => "edit_book",
            Request::DeleteBook { .. } => "delete_book",
            Request::AddMember { .. } => "add_member",
            Request::Borrow { .. } => "borrow",
            Request::Return { .. } => "return",
            Request::ClearLogs {} => "clear_logs",
        }
    }
}

/// Success message or the list of error messages
pub type Outcome = Result<String, Vec<String>>;

impl Library {
    /// Run one request and describe the result
    pub fn handle(&self, request: Request) -> Outcome {
        debug!(action = request.action(), "handling request");

        let result = match request {
            Request::AddBook { title, category } => self
                .add_book(&title, &category)
                .map(|book| format!("Book \"{}\" added.", book.title)),
            Request::EditBook {
                id,
                title,
                category,
            } => self
                .edit_book(id, &title, &category)
                .map(|_| "Book updated.".to_string()),
            Request::DeleteBook { id } => self
                .delete_book(id)
                .map(|_| "Book deleted.".to_string()),
            Request::AddMember { name, email } => self
                .add_member(&name, email.as_deref())
                .map(|member| format!("Member \"{}\" added.", member.name)),
            Request::Borrow { book_id, member_id } => {
                self.borrow(book_id, member_id).map(|loan| {
                    format!(
                        "Book \"{}\" borrowed by {}. Due: {}",
                        loan.book_title,
                        loan.member_name,
                        loan.due_at.with_timezone(&Local).format("%Y-%m-%d")
                    )
                })
            }
            Request::Return { loan_id } => self.return_loan(loan_id).map(|loan| {
                if loan.status == LoanStatus::ReturnedLate {
                    "Return recorded. Status: LATE".to_string()
                } else {
                    "Return recorded. Status: on time".to_string()
                }
            }),
            Request::ClearLogs {} => self.clear_log().map(|_| "Log cleared.".to_string()),
        };

        result.map_err(|e| e.messages())
    }
}
