//! Error types for the acervo catalog core.

use thiserror::Error;

/// Result type alias using acervo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for acervo operations.
///
/// The domain pipeline (normalizer, filter engine, view projection,
/// aggregation) is non-throwing; these variants only surface at the
/// store boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// Store call failed (load or persist).
    #[error("Store error: {0}")]
    Store(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_store() {
        let err = Error::Store("connection refused".to_string());
        assert_eq!(err.to_string(), "Store error: connection refused");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("filter f-1".to_string());
        assert_eq!(err.to_string(), "Not found: filter f-1");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty record id".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty record id");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
