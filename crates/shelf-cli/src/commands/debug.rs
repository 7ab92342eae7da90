//! Diagnostics command handlers

use anyhow::{bail, Result};

use shelf_core::{Config, Library};

use crate::output::Output;

/// Dump the complete stored state as JSON
///
/// Only available when diagnostics are enabled in the configuration.
pub fn dump(library: &Library, config: &Config, output: &Output) -> Result<()> {
    if !config.diagnostics {
        bail!(
            "Diagnostics are disabled.\n\
             Enable them with: shelf config set diagnostics true"
        );
    }

    let snapshot = library.snapshot()?;
    output.print_json(&snapshot)
}
