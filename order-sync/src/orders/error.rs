//! Draft lifecycle errors

use super::storage::StorageError;
use sales_client::{ClientError, SubmitError};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Why a draft could not be saved
///
/// Raised before any storage or network access.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("No customer selected")]
    NoCustomer,

    #[error("No payment method selected")]
    NoPaymentMethod,

    #[error("No shipping method selected")]
    NoShippingMethod,

    #[error("Payment method requires a payment plan")]
    NoPaymentPlan,

    #[error("Order total {total:.2} is below the plan minimum {minimum:.2}")]
    PlanBelowMinimum { total: f64, minimum: f64 },

    #[error("Payment plan is incomplete: {0}")]
    PlanIncomplete(&'static str),

    #[error("Out of range: {0}")]
    OutOfRange(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyCart => ErrorCode::CartEmpty,
            Self::NoCustomer => ErrorCode::CustomerRequired,
            Self::NoPaymentMethod => ErrorCode::PaymentMethodRequired,
            Self::NoShippingMethod => ErrorCode::ShippingMethodRequired,
            Self::NoPaymentPlan => ErrorCode::PaymentPlanRequired,
            Self::PlanBelowMinimum { .. } => ErrorCode::PaymentPlanBelowMinimum,
            Self::PlanIncomplete(_) => ErrorCode::PaymentPlanIncomplete,
            Self::OutOfRange(_) => ErrorCode::CartLineOutOfRange,
        }
    }
}

/// Draft manager errors
#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Draft not found: {0}")]
    NotFound(String),

    #[error("Product {product_code} is not in draft {draft_id}")]
    ItemNotFound {
        draft_id: String,
        product_code: String,
    },

    #[error("Draft {0} has a submission in flight")]
    InFlight(String),

    /// The submission failed; the draft is persisted as `ERROR`
    #[error("{source}")]
    Submission {
        #[source]
        source: SubmitError,
        retry_count: u32,
    },

    #[error("Remote error: {0}")]
    Remote(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type DraftResult<T> = Result<T, DraftError>;

impl DraftError {
    /// Whether the draft stays available for a retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission { .. })
    }
}

/// Map a storage error to an error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => return ErrorCode::StorageCorrupted,
        StorageError::DraftNotFound(_) => return ErrorCode::DraftNotFound,
        _ => {}
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    ErrorCode::StorageError
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::Validation(e) => AppError::with_message(e.code(), e.to_string()),
            DraftError::NotFound(id) => {
                AppError::with_message(ErrorCode::DraftNotFound, format!("Draft not found: {}", id))
                    .with_detail("draft_id", id)
            }
            DraftError::ItemNotFound {
                draft_id,
                product_code,
            } => AppError::with_message(
                ErrorCode::NotFound,
                format!("Product {} is not in draft {}", product_code, draft_id),
            )
            .with_detail("draft_id", draft_id)
            .with_detail("product_code", product_code),
            DraftError::InFlight(id) => AppError::with_message(
                ErrorCode::DraftInFlight,
                format!("Draft {} has a submission in flight", id),
            )
            .with_detail("draft_id", id),
            DraftError::Submission {
                source,
                retry_count,
            } => {
                let mut app = AppError::with_message(source.code(), source.to_string())
                    .with_detail("retry_count", retry_count);
                if let SubmitError::Rejected { status, .. } = source {
                    app = app.with_detail("status", status);
                }
                app
            }
            DraftError::Remote(e) => AppError::with_message(e.code(), e.to_string()),
            DraftError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                AppError::with_message(code, e.to_string())
            }
        }
    }
}
