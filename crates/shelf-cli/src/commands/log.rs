//! Activity log command handlers

use anyhow::Result;

use shelf_core::Library;

use crate::output::Output;
use crate::prompt::confirm;

/// Print the activity log
pub fn show(library: &Library, output: &Output) -> Result<()> {
    let entries = library.activity().entries()?;
    output.print_log(&entries)
}

/// Empty the activity log
pub fn clear(library: &Library, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() && !confirm("Clear the activity log?")? {
        output.message("Cancelled.");
        return Ok(());
    }

    library.clear_log()?;
    output.success("Log cleared.");
    Ok(())
}
