//! Client error types

use shared::ErrorCode;
use thiserror::Error;

/// Error for read calls (order listing, payment plans)
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-2xx response
    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorCode::NetworkTimeout,
            Self::Http(_) => ErrorCode::NetworkUnavailable,
            Self::Timeout(_) => ErrorCode::NetworkTimeout,
            Self::Unauthorized => ErrorCode::NotAuthenticated,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Api { .. } => ErrorCode::RemoteRejected,
            Self::InvalidResponse(_) => ErrorCode::InvalidResponse,
        }
    }
}

/// Why an order submission failed
///
/// Every variant leaves the draft intact for a retry: transport failures
/// may succeed unchanged, rejections may succeed after the seller edits
/// the draft.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// No answer within the timeout; the server may or may not have the order
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer; `message` is the server's message or a raw body snippet
    #[error("Server rejected order ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl SubmitError {
    /// Transport failure (as opposed to an answer from the server)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout(_) => ErrorCode::NetworkTimeout,
            Self::Network(_) => ErrorCode::NetworkUnavailable,
            Self::Rejected { status: 401, .. } => ErrorCode::NotAuthenticated,
            Self::Rejected { .. } => ErrorCode::RemoteRejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_error_classification() {
        assert!(SubmitError::Timeout(10).is_transient());
        assert!(SubmitError::Network("refused".into()).is_transient());

        let rejected = SubmitError::Rejected {
            status: 422,
            message: "duplicate order".into(),
        };
        assert!(!rejected.is_transient());
        assert!(rejected.code().is_retryable());
        assert_eq!(rejected.code(), ErrorCode::RemoteRejected);

        // a bad token will not fix itself on resubmission
        let unauthorized = SubmitError::Rejected {
            status: 401,
            message: "token expired".into(),
        };
        assert_eq!(unauthorized.code(), ErrorCode::NotAuthenticated);
        assert!(!unauthorized.code().is_retryable());
    }

    #[test]
    fn test_submit_error_messages() {
        assert_eq!(
            SubmitError::Timeout(10).to_string(),
            "Request timed out after 10s"
        );
        let rejected = SubmitError::Rejected {
            status: 400,
            message: "customer blocked".into(),
        };
        assert_eq!(
            rejected.to_string(),
            "Server rejected order (400): customer blocked"
        );
    }

    #[test]
    fn test_unauthorized_rejection_code() {
        let err = SubmitError::Rejected {
            status: 401,
            message: "token expired".into(),
        };
        assert_eq!(err.code(), ErrorCode::NotAuthenticated);
    }
}
