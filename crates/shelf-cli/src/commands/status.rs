//! Status command handler

use anyhow::Result;

use shelf_core::{Config, Library};

use crate::output::{Output, OutputFormat};

/// Show where the data lives and how much of it there is
pub fn show(library: &Library, config: &Config, output: &Output) -> Result<()> {
    let summary = library.summary()?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "diagnostics": config.diagnostics,
                    "counts": summary
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Location:    {}", config.data_dir.display());
            println!(
                "  Diagnostics: {}",
                if config.diagnostics {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!();
            println!("Books:");
            println!("  Total:     {}", summary.books);
            println!("  Available: {}", summary.available_books);
            println!("  Borrowed:  {}", summary.books - summary.available_books);
            println!();
            println!("Members: {}", summary.members);
            println!();
            println!("Loans:");
            println!("  Total:   {}", summary.loans);
            println!("  Open:    {}", summary.open_loans);
            println!("  Overdue: {}", summary.overdue_loans);
        }
    }

    Ok(())
}
