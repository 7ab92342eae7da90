//! Member command handlers

use anyhow::Result;

use shelf_core::Library;

use crate::output::Output;

/// Register a member
pub fn add(library: &Library, name: String, email: Option<String>, output: &Output) -> Result<()> {
    let member = library.add_member(&name, email.as_deref())?;

    output.success(&format!("Member \"{}\" added.", member.name));
    output.print_members(std::slice::from_ref(&member))
}

/// List all members
pub fn list(library: &Library, output: &Output) -> Result<()> {
    let members = library.members()?;
    output.print_members(&members)
}
