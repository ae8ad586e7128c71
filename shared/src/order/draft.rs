//! Draft - locally owned order that the remote system has not confirmed yet

use super::types::{
    CustomerSnapshot, DraftItem, PaymentMethod, PaymentPlan, PaymentTerms, ProductSnapshot,
    ShippingMethod,
};
use serde::{Deserialize, Serialize};

/// Draft status
///
/// ```text
/// DRAFT ──submit──▶ SYNCING ──ok──▶ (deleted, SYNCED)
///                      │
///                      └──fail──▶ ERROR ──retry──▶ SYNCING
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    #[default]
    Draft,
    Syncing,
    Synced,
    Error,
}

/// Durable in-progress order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    /// Local unique id (UUID), never reused
    pub id: String,
    /// Sequential order number reserved on first save
    pub display_id: u64,
    pub customer: CustomerSnapshot,
    pub items: Vec<DraftItem>,
    /// Σ quantity × unit_price, recomputed on every mutation
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    #[serde(default)]
    pub terms: PaymentTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: DraftStatus,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Draft {
    pub fn is_in_flight(&self) -> bool {
        self.status == DraftStatus::Syncing
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// One cart line as assembled by the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: f64,
    pub unit_price: f64,
}

/// Payment / shipping selection as assembled by the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentSelection {
    pub method: Option<PaymentMethod>,
    pub shipping: Option<ShippingMethod>,
    /// Chosen installment plan (only meaningful for installment billing)
    pub plan: Option<PaymentPlan>,
}

/// Input for `create_or_update`
///
/// `draft_id = None` creates a new draft; `Some(id)` edits an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DraftInput {
    pub draft_id: Option<String>,
    pub cart: Vec<CartLine>,
    pub customer: Option<CustomerSnapshot>,
    pub payment: PaymentSelection,
    pub notes: Option<String>,
}

/// Draft change notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftEvent {
    Saved { draft_id: String, display_id: u64 },
    Submitting { draft_id: String },
    Submitted { draft_id: String, order_id: String },
    Failed { draft_id: String, message: String, retry_count: u32 },
    Discarded { draft_id: String },
}
