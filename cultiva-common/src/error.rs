//! Common error types for Cultiva

use thiserror::Error;

/// Common result type for Cultiva operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Cultiva services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed range or shape validation; carries every violated field
    #[error("Validation failed: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a validation error from a list of violated field descriptions
    pub fn validation<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Error::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_all_fields() {
        let err = Error::validation(["yield_prediction out of range", "growth_rate out of range"]);
        let msg = err.to_string();
        assert!(msg.contains("yield_prediction"));
        assert!(msg.contains("growth_rate"));
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound("plant 42".to_string());
        assert_eq!(err.to_string(), "Not found: plant 42");
    }
}
