//! Data models for shelf
//!
//! Defines the records kept in the three collections: Book, Member and Loan.
//! Field names serialize in camelCase (`titleUpper`, `bookId`, `dueAt`, ...)
//! because the JSON documents are read by other tools.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// How long a book may be kept before a return counts as late
pub const LOAN_PERIOD_DAYS: i64 = 3;

/// Maximum length of a book slug
pub const SLUG_MAX_LEN: usize = 40;

/// The loan period as a duration
pub fn loan_period() -> Duration {
    Duration::days(LOAN_PERIOD_DAYS)
}

/// Build a URL-friendly slug from a title
///
/// ASCII letters are lowercased; every run of characters outside `[a-z0-9]`
/// becomes a single `-`. The result is cut to [`SLUG_MAX_LEN`] characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len().min(SLUG_MAX_LEN));
    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    // Only ASCII was pushed, so byte and char lengths agree
    slug.truncate(SLUG_MAX_LEN);
    slug
}

/// Whether a book can currently be lent out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookStatus::Available => write!(f, "available"),
            BookStatus::Borrowed => write!(f, "borrowed"),
        }
    }
}

/// A book in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub title: String,
    /// Uppercase form of the title
    pub title_upper: String,
    /// URL-friendly form of the title, see [`slugify`]
    pub slug: String,
    pub category: String,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Create an available book, deriving the normalized title fields
    pub fn new(
        id: u64,
        title: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let title = title.into();
        Self {
            id,
            title_upper: title.to_uppercase(),
            slug: slugify(&title),
            title,
            category: category.into(),
            status: BookStatus::Available,
            created_at,
        }
    }

    /// Replace title and category, re-deriving the normalized fields
    ///
    /// Status and creation time are left alone.
    pub fn retitle(&mut self, title: impl Into<String>, category: impl Into<String>) {
        let title = title.into();
        self.title_upper = title.to_uppercase();
        self.slug = slugify(&title);
        self.title = title;
        self.category = category.into();
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }
}

/// A library member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: u64,
    pub name: String,
    /// Contact address; older documents store an empty string for "none"
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        email: Option<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.filter(|e| !e.is_empty()),
            joined_at,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Where a loan is in its lifecycle
///
/// `Borrowed` is the only open state; the other two are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    ReturnedLate,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Borrowed => write!(f, "borrowed"),
            LoanStatus::Returned => write!(f, "returned"),
            LoanStatus::ReturnedLate => write!(f, "returned-late"),
        }
    }
}

/// A book lent to a member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: u64,
    pub book_id: u64,
    pub member_id: u64,
    /// Book title at the time of borrowing
    pub book_title: String,
    /// Member name at the time of borrowing
    pub member_name: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

impl Loan {
    /// Open a loan of `book` to `member`, due one loan period later
    pub fn open(id: u64, book: &Book, member: &Member, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            book_id: book.id,
            member_id: member.id,
            book_title: book.title.clone(),
            member_name: member.name.clone(),
            borrowed_at,
            due_at: borrowed_at + loan_period(),
            returned_at: None,
            status: LoanStatus::Borrowed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Borrowed
    }

    /// A return at `at` is late only if strictly after the due date
    pub fn is_late_at(&self, at: DateTime<Utc>) -> bool {
        at > self.due_at
    }

    /// Still open and past its due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.is_late_at(now)
    }

    /// Record the return and settle the final status
    ///
    /// Callers must check [`Loan::is_open`] first; closing twice would move
    /// `returned_at`.
    pub fn close(&mut self, at: DateTime<Utc>) -> LoanStatus {
        self.returned_at = Some(at);
        self.status = if self.is_late_at(at) {
            LoanStatus::ReturnedLate
        } else {
            LoanStatus::Returned
        };
        self.status
    }
}
