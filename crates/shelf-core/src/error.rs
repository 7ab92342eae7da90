//! Errors raised by library operations
//!
//! Every variant except `Storage` is raised before anything is written, so a
//! failed operation leaves all collections as they were.

use thiserror::Error;

use crate::storage::StorageError;

/// Kind of record an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Book,
    Member,
    Loan,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Book => write!(f, "Book"),
            Entity::Member => write!(f, "Member"),
            Entity::Loan => write!(f, "Loan"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LibraryError {
    /// Missing or malformed input; one message per problem
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// A referenced id does not resolve
    #[error("{entity} #{id} not found")]
    NotFound { entity: Entity, id: u64 },

    /// The request breaks a lending rule
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LibraryError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LibraryError::Validation(vec![message.into()])
    }

    pub(crate) fn not_found(entity: Entity, id: u64) -> Self {
        LibraryError::NotFound { entity, id }
    }

    /// The error as a list of user-facing messages
    pub fn messages(&self) -> Vec<String> {
        match self {
            LibraryError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Result type for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_validation_messages() {
        let err = LibraryError::Validation(vec![
            "Title is required.".to_string(),
            "Category is required.".to_string(),
        ]);
        assert_eq!(err.messages().len(), 2);
        assert_eq!(err.to_string(), "Title is required.; Category is required.");
    }

    #[test]
    fn test_not_found_display() {
        let err = LibraryError::not_found(Entity::Loan, 12);
        assert_eq!(err.to_string(), "Loan #12 not found");
        assert_eq!(err.messages(), vec!["Loan #12 not found".to_string()]);
    }

    #[test]
    fn test_storage_error_converts() {
        let storage = StorageError::from_write(
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("/data/books.json"),
        );
        let err: LibraryError = storage.into();
        assert!(matches!(err, LibraryError::Storage(_)));
        assert!(err.messages()[0].contains("Permission denied"));
    }
}
