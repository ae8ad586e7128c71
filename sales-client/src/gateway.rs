//! OrderGateway - the seam between the sync core and the remote system

use crate::{ClientResult, SubmitError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::order::{OrderSubmission, PaymentPlan, RemoteOrder};

/// Successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Remote-assigned id, when the server returned one
    pub remote_id: Option<String>,
}

/// Remote order operations used by the sync core
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// `POST /orders` - exactly one HTTP call, bounded by the client timeout
    async fn submit_order(&self, order: &OrderSubmission) -> Result<SubmitReceipt, SubmitError>;

    /// `GET /orders` - authoritative order list for the current identity
    async fn list_orders(&self) -> ClientResult<Vec<RemoteOrder>>;

    /// `GET /customers/{id}/payment-plans`
    async fn payment_plans(&self, customer_id: &str) -> ClientResult<Vec<PaymentPlan>>;
}
