//! Custom error types for Bookkeeper
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Bookkeeper operations
#[derive(Error, Debug)]
pub enum BookkeeperError {
    /// A precondition the caller can be told about without touching the store
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The store round trip completed but no row matched
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Failure reported by SQLite, passed through untouched
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Storage failures outside SQLite (lock poisoning, missing database)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be coerced back to its declared type
    #[error("Cannot decode field '{field}': {message}")]
    Decode { field: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(String),
}

impl BookkeeperError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a decode error for a named field
    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an invalid state error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this error came from the underlying store
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for BookkeeperError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BookkeeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Bookkeeper operations
pub type BookkeeperResult<T> = Result<T, BookkeeperError>;
