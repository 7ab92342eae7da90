//! Raw request handler
//!
//! Feeds one request object straight into the library, the same way a
//! non-CLI front end would.

use std::io::{self, Read};

use anyhow::{bail, Context, Result};

use shelf_core::{Library, Request};

use crate::output::Output;

/// Read a request from the argument (or stdin for `-`) and run it
pub fn run(library: &Library, input: String, output: &Output) -> Result<()> {
    let json = if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        input
    };

    let request: Request = serde_json::from_str(&json).context("Invalid request")?;
    let outcome = library.handle(request);
    output.print_outcome(&outcome);

    if let Err(errors) = outcome {
        bail!("Request failed with {} error(s)", errors.len());
    }
    Ok(())
}
