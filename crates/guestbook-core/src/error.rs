//! Typed errors for the guestbook core
//!
//! Lookups of missing records surface as `BookNotFound` / `GreetingNotFound`
//! so callers can tell an absent record apart from a store failure. Store
//! failures propagate unchanged; the core never retries.

use thiserror::Error;

use crate::config::ConfigError;
use crate::models::{BookId, GreetingId};

/// Errors that can occur in guestbook operations
#[derive(Error, Debug)]
pub enum GuestbookError {
    /// No book exists with the requested id
    #[error("Book not found: {id}")]
    BookNotFound { id: BookId },

    /// No greeting with the requested id exists in the book's group
    #[error("Greeting not found: {id} (book {book_id})")]
    GreetingNotFound { book_id: BookId, id: GreetingId },

    /// Malformed identifier or empty required field
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl GuestbookError {
    /// Whether this error means a requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GuestbookError::BookNotFound { .. } | GuestbookError::GreetingNotFound { .. }
        )
    }
}

/// Result type for guestbook operations
pub type Result<T> = std::result::Result<T, GuestbookError>;
