//! Shared types for the field-sales order sync workspace
//!
//! Types used by both the device-side core (`order-sync`) and the remote
//! submission client (`sales-client`): order/draft models, the unified
//! error codes, and small utilities.

pub mod error;
pub mod order;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
