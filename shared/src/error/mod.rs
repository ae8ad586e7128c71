//! Unified error system
//!
//! - [`ErrorCode`]: stable numeric codes shared with the UI layer
//! - [`ErrorCategory`]: classification of codes by range
//! - [`AppError`]: code + message + optional details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order / draft errors
//! - 8xxx: Remote sync errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::CartEmpty);
//! assert_eq!(err.code.code(), 4101);
//!
//! let err = AppError::with_message(ErrorCode::NetworkTimeout, "no answer after 10s")
//!     .with_detail("draft_id", "d-1");
//! assert!(err.is_retryable());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
