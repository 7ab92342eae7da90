//! Shelf CLI
//!
//! Command-line interface for shelf - books, members and loans.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shelf_core::{Config, Library, LibraryError, StorageError};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - keep track of a small lending library")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage members
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Borrow and return books
    Loan {
        #[command(subcommand)]
        command: LoanCommands,
    },
    /// Show or clear the activity log
    Log {
        #[command(subcommand)]
        command: Option<LogCommands>,
    },
    /// Run one JSON request (use - to read it from stdin)
    Request {
        /// Request object, e.g. {"action":"return","loanId":1}
        json: String,
    },
    /// Show data location and collection counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Diagnostics
    Debug {
        #[command(subcommand)]
        command: DebugCommands,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a book
    #[command(alias = "create")]
    Add {
        /// Book title
        title: String,
        /// Book category
        #[arg(short, long)]
        category: String,
    },
    /// Change a book's title and category
    Edit {
        /// Book ID
        id: u64,
        /// New title
        #[arg(short = 'T', long)]
        title: String,
        /// New category
        #[arg(short, long)]
        category: String,
    },
    /// Delete a book that is not lent out
    #[command(alias = "rm")]
    Delete {
        /// Book ID
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List books
    #[command(alias = "ls")]
    List {
        /// Only books that can be borrowed now
        #[arg(short, long)]
        available: bool,
    },
    /// Show book details
    Show {
        /// Book ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Register a member
    #[command(alias = "create")]
    Add {
        /// Member name
        name: String,
        /// Contact email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// List members
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
enum LoanCommands {
    /// Lend a book to a member
    Borrow {
        /// Book ID
        book_id: u64,
        /// Member ID
        member_id: u64,
    },
    /// Record a returned book
    Return {
        /// Loan ID
        loan_id: u64,
    },
    /// List loans
    #[command(alias = "ls")]
    List {
        /// Only loans not yet returned
        #[arg(long, conflicts_with = "overdue")]
        open: bool,
        /// Only open loans past their due date
        #[arg(long)]
        overdue: bool,
    },
}

#[derive(Subcommand, Clone)]
enum LogCommands {
    /// Print the activity log
    Show,
    /// Empty the activity log
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, diagnostics, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum DebugCommands {
    /// Print everything the library holds as JSON
    Dump,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let result = run(cli);

    if let Err(ref e) = result {
        if let Some(hint) = storage_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening the library
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let library = Library::open_with_config(&config);
    info!(data_dir = %config.data_dir.display(), "library opened");

    match cli.command {
        Commands::Book { command } => handle_book_command(command, &library, &output),
        Commands::Member { command } => match command {
            MemberCommands::Add { name, email } => {
                commands::member::add(&library, name, email, &output)
            }
            MemberCommands::List => commands::member::list(&library, &output),
        },
        Commands::Loan { command } => match command {
            LoanCommands::Borrow { book_id, member_id } => {
                commands::loan::borrow(&library, book_id, member_id, &output)
            }
            LoanCommands::Return { loan_id } => {
                commands::loan::return_loan(&library, loan_id, &output)
            }
            LoanCommands::List { open, overdue } => {
                commands::loan::list(&library, open, overdue, &output)
            }
        },
        Commands::Log { command } => match command {
            Some(LogCommands::Show) | None => commands::log::show(&library, &output),
            Some(LogCommands::Clear { yes }) => commands::log::clear(&library, yes, &output),
        },
        Commands::Request { json } => commands::request::run(&library, json, &output),
        Commands::Status => commands::status::show(&library, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Debug { command } => match command {
            DebugCommands::Dump => commands::debug::dump(&library, &config, &output),
        },
    }
}

/// Recovery advice for storage failures, wherever they surfaced
fn storage_hint(error: &anyhow::Error) -> Option<&'static str> {
    let storage = match error.downcast_ref::<LibraryError>() {
        Some(LibraryError::Storage(e)) => Some(e),
        _ => error.downcast_ref::<StorageError>(),
    };
    storage
        .filter(|e| e.is_recoverable())
        .and_then(StorageError::recovery_suggestion)
}

fn handle_book_command(command: BookCommands, library: &Library, output: &Output) -> Result<()> {
    match command {
        BookCommands::Add { title, category } => {
            commands::book::add(library, title, category, output)
        }
        BookCommands::Edit {
            id,
            title,
            category,
        } => commands::book::edit(library, id, title, category, output),
        BookCommands::Delete { id, yes } => commands::book::delete(library, id, yes, output),
        BookCommands::List { available } => commands::book::list(library, available, output),
        BookCommands::Show { id } => commands::book::show(library, id, output),
    }
}

/// Initialize diagnostic logging
///
/// Only initializes if SHELF_LOG environment variable is set; its value is
/// the level. Logs go to config.log_file when set, stderr otherwise.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("shelf_core={},shelf_cli={}", log_level, log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore error if already initialized
    let _ = match &config.log_file {
        Some(log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    info!("logging initialized");
}
