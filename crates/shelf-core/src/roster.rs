//! Roster operations (members)
//!
//! Members can only be added and listed.

use tracing::info;
use validator::ValidateEmail;

use crate::error::{Entity, LibraryError, LibraryResult};
use crate::library::{highest_id, Library, MEMBERS};
use crate::models::Member;

impl Library {
    /// Register a new member
    ///
    /// An empty or blank email counts as no email.
    pub fn add_member(&self, name: &str, email: Option<&str>) -> LibraryResult<Member> {
        let name = name.trim();
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let mut problems = Vec::new();
        if name.is_empty() {
            problems.push("Name is required.".to_string());
        }
        if let Some(ref address) = email {
            if !address.validate_email() {
                problems.push(format!("Email address '{}' is not valid.", address));
            }
        }
        if !problems.is_empty() {
            return Err(LibraryError::Validation(problems));
        }

        let _guard = self.lock_writes();
        let now = self.now();
        let mut members: Vec<Member> = self.collections().load(MEMBERS)?;

        let id = self.issue_id(MEMBERS, highest_id(&members, |m| m.id))?;
        let member = Member::new(id, name, email, now);
        members.push(member.clone());
        self.collections().save(MEMBERS, &members)?;

        info!(member_id = member.id, "member added");
        let message = match member.email {
            Some(ref address) => format!("Add member: {} <{}>", member.name, address),
            None => format!("Add member: {}", member.name),
        };
        self.record(now, &message);
        Ok(member)
    }

    /// Look up one member
    pub fn member(&self, id: u64) -> LibraryResult<Member> {
        self.members()?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| LibraryError::not_found(Entity::Member, id))
    }
}
