//! Error types for FastNews.

use thiserror::Error;

/// Common error type for FastNews.
#[derive(Error, Debug)]
pub enum FastNewsError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Feed could not be fetched.
    #[error("feed error: {0}")]
    Feed(String),

    /// Feed document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Push message could not be delivered.
    #[error("push error: {0}")]
    Push(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for a value crossing a module boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),
}

impl From<sqlx::Error> for FastNewsError {
    fn from(e: sqlx::Error) -> Self {
        FastNewsError::Database(e.to_string())
    }
}

/// Result type alias for FastNews operations.
pub type Result<T> = std::result::Result<T, FastNewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_display() {
        let err = FastNewsError::Feed("HTTP error: 503".to_string());
        assert_eq!(err.to_string(), "feed error: HTTP error: 503");
    }

    #[test]
    fn test_push_error_display() {
        let err = FastNewsError::Push("topic rejected".to_string());
        assert_eq!(err.to_string(), "push error: topic rejected");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = FastNewsError::NotFound("marker".to_string());
        assert_eq!(err.to_string(), "marker not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FastNewsError = io_err.into();
        assert!(matches!(err, FastNewsError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: FastNewsError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, FastNewsError::Database(_)));
    }
}
