//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use shelf_core::{Book, Loan, Member, Outcome};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
        println!("{}", json);
        Ok(())
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", book.id);
                println!("Title:    {}", book.title);
                println!("Category: {}", book.category);
                println!("Slug:     {}", book.slug);
                println!("Status:   {}", book.status);
                println!("Added:    {}", local(book.created_at).format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => self.print_json(book)?,
            OutputFormat::Quiet => println!("{}", book.id),
        }
        Ok(())
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return Ok(());
                }
                for book in books {
                    println!(
                        "{:>4} | {:<35} | {:<15} | {}",
                        book.id,
                        truncate(&book.title, 35),
                        truncate(&book.category, 15),
                        book.status
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => self.print_json(books)?,
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
        Ok(())
    }

    /// Print a list of members
    pub fn print_members(&self, members: &[Member]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if members.is_empty() {
                    println!("No members found.");
                    return Ok(());
                }
                for member in members {
                    println!(
                        "{:>4} | {:<25} | {:<30} | {}",
                        member.id,
                        truncate(&member.name, 25),
                        truncate(member.email.as_deref().unwrap_or("-"), 30),
                        local(member.joined_at).format("%Y-%m-%d")
                    );
                }
                println!("\n{} member(s)", members.len());
            }
            OutputFormat::Json => self.print_json(members)?,
            OutputFormat::Quiet => {
                for member in members {
                    println!("{}", member.id);
                }
            }
        }
        Ok(())
    }

    /// Print a list of loans, flagging the ones overdue at `now`
    pub fn print_loans(&self, loans: &[Loan], now: DateTime<Utc>) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if loans.is_empty() {
                    println!("No loans found.");
                    return Ok(());
                }
                for loan in loans {
                    let overdue = if loan.is_overdue(now) { " (OVERDUE)" } else { "" };
                    println!(
                        "{:>4} | {:<30} | {:<20} | {} -> {} | {}{}",
                        loan.id,
                        truncate(&loan.book_title, 30),
                        truncate(&loan.member_name, 20),
                        local(loan.borrowed_at).format("%Y-%m-%d"),
                        local(loan.due_at).format("%Y-%m-%d"),
                        loan.status,
                        overdue
                    );
                }
                println!("\n{} loan(s)", loans.len());
            }
            OutputFormat::Json => self.print_json(loans)?,
            OutputFormat::Quiet => {
                for loan in loans {
                    println!("{}", loan.id);
                }
            }
        }
        Ok(())
    }

    /// Print activity log lines
    pub fn print_log(&self, entries: &[String]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("Log is empty.");
                    return Ok(());
                }
                for entry in entries {
                    println!("{}", entry);
                }
            }
            OutputFormat::Json => self.print_json(entries)?,
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry);
                }
            }
        }
        Ok(())
    }

    /// Print the result of a raw request
    pub fn print_outcome(&self, outcome: &Outcome) {
        match (self.format, outcome) {
            (OutputFormat::Json, Ok(message)) => {
                println!("{}", serde_json::json!({"ok": true, "message": message}));
            }
            (OutputFormat::Json, Err(errors)) => {
                println!("{}", serde_json::json!({"ok": false, "errors": errors}));
            }
            (_, Ok(message)) => self.success(message),
            (_, Err(errors)) => self.errors(errors),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print error messages to stderr
    ///
    /// Errors are shown even in quiet mode.
    pub fn errors(&self, errors: &[String]) {
        for error in errors {
            eprintln!("✗ {}", error);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn local(at: DateTime<Utc>) -> DateTime<Local> {
    at.with_timezone(&Local)
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
