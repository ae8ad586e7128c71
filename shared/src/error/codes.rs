//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order / draft errors
//! - 8xxx: Remote sync errors
//! - 9xxx: System errors

use super::category::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the UI layer can localise messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Remote rejected the bearer token
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,

    // ==================== 4xxx: Order ====================
    /// Draft not found
    DraftNotFound = 4001,
    /// Draft has a submission in flight
    DraftInFlight = 4002,
    /// Cart is empty
    CartEmpty = 4101,
    /// No customer selected
    CustomerRequired = 4102,
    /// No payment method selected
    PaymentMethodRequired = 4103,
    /// No shipping method selected
    ShippingMethodRequired = 4104,
    /// Installment billing without a payment plan
    PaymentPlanRequired = 4105,
    /// Order total below the plan minimum
    PaymentPlanBelowMinimum = 4106,
    /// Plan day offsets / installment count inconsistent
    PaymentPlanIncomplete = 4107,
    /// Cart line price / quantity or order total outside the supported range
    CartLineOutOfRange = 4108,

    // ==================== 8xxx: Sync ====================
    /// Remote did not answer within the timeout
    NetworkTimeout = 8001,
    /// Remote unreachable
    NetworkUnavailable = 8002,
    /// Remote answered with a non-2xx status
    RemoteRejected = 8003,
    /// Remote answered 2xx with an unreadable body
    InvalidResponse = 8004,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Local storage error
    StorageError = 9002,
    /// Disk full
    StorageFull = 9003,
    /// Local database corrupted
    StorageCorrupted = 9004,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Category of this code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Whether resubmitting without changing data might succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkTimeout
                | Self::NetworkUnavailable
                | Self::RemoteRejected
                | Self::InvalidResponse
        )
    }

    /// Default English message (UI localises by code)
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token has expired",

            Self::DraftNotFound => "Draft not found",
            Self::DraftInFlight => "Draft is being submitted",
            Self::CartEmpty => "Cart is empty",
            Self::CustomerRequired => "Select a customer",
            Self::PaymentMethodRequired => "Select a payment method",
            Self::ShippingMethodRequired => "Select a shipping method",
            Self::PaymentPlanRequired => "Select a payment plan",
            Self::PaymentPlanBelowMinimum => "Order total is below the plan minimum",
            Self::PaymentPlanIncomplete => "Payment plan is incomplete",
            Self::CartLineOutOfRange => "Price or quantity out of range",

            Self::NetworkTimeout => "Server did not respond in time",
            Self::NetworkUnavailable => "Server unreachable",
            Self::RemoteRejected => "Server rejected the order",
            Self::InvalidResponse => "Invalid server response",

            Self::InternalError => "Internal error",
            Self::StorageError => "Local storage error",
            Self::StorageFull => "Device storage is full",
            Self::StorageCorrupted => "Local storage is corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error for converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidRequest),

            1001 => Ok(Self::NotAuthenticated),
            1003 => Ok(Self::TokenExpired),

            4001 => Ok(Self::DraftNotFound),
            4002 => Ok(Self::DraftInFlight),
            4101 => Ok(Self::CartEmpty),
            4102 => Ok(Self::CustomerRequired),
            4103 => Ok(Self::PaymentMethodRequired),
            4104 => Ok(Self::ShippingMethodRequired),
            4105 => Ok(Self::PaymentPlanRequired),
            4106 => Ok(Self::PaymentPlanBelowMinimum),
            4107 => Ok(Self::PaymentPlanIncomplete),
            4108 => Ok(Self::CartLineOutOfRange),

            8001 => Ok(Self::NetworkTimeout),
            8002 => Ok(Self::NetworkUnavailable),
            8003 => Ok(Self::RemoteRejected),
            8004 => Ok(Self::InvalidResponse),

            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::StorageError),
            9003 => Ok(Self::StorageFull),
            9004 => Ok(Self::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
