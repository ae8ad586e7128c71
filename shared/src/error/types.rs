//! Application error type

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the form errors take when they reach the UI layer:
/// - a stable [`ErrorCode`] for localisation
/// - a human-readable message
/// - optional structured details (draft id, retry count, ...)
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Whether the failed operation can be retried without re-entering data
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::CartEmpty);
        assert_eq!(err.code, ErrorCode::CartEmpty);
        assert_eq!(err.message, "Cart is empty");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::with_message(ErrorCode::NetworkTimeout, "timed out after 10s")
            .with_detail("draft_id", "d-1")
            .with_detail("retry_count", 2);

        assert!(err.is_retryable());
        let details = err.details.unwrap();
        assert_eq!(details.get("draft_id").unwrap(), "d-1");
        assert_eq!(details.get("retry_count").unwrap(), 2);
    }

    #[test]
    fn test_display_is_message() {
        let err = AppError::with_message(ErrorCode::CustomerRequired, "Select a customer");
        assert_eq!(err.to_string(), "Select a customer");
    }
}
