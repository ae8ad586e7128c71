//! Local order records kept after a successful submission

use super::draft::Draft;
use super::types::{CustomerSnapshot, DraftItem, PaymentMethod, PaymentTerms, ShippingMethod};
use serde::{Deserialize, Serialize};

/// Local sync status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted from this device, not yet seen in a remote listing
    #[default]
    Pending,
    /// Confirmed by the remote order listing
    Synced,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order record in local order storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalOrder {
    /// Remote id when known, otherwise the originating draft id
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Vec<DraftItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<ShippingMethod>,
    #[serde(default)]
    pub terms: PaymentTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub seller_id: String,
    #[serde(default)]
    pub seller_name: String,
    pub status: OrderStatus,
    /// Server-owned workflow stage, read-only here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LocalOrder {
    /// Build the pending record for a draft the server just accepted
    pub fn from_submitted(
        draft: &Draft,
        remote_id: Option<String>,
        seller_id: &str,
        seller_name: &str,
        now: i64,
    ) -> Self {
        Self {
            id: remote_id.unwrap_or_else(|| draft.id.clone()),
            display_id: Some(draft.display_id),
            draft_id: Some(draft.id.clone()),
            customer: Some(draft.customer.clone()),
            customer_id: Some(draft.customer.id.clone()),
            items: draft.items.clone(),
            total: draft.total,
            payment_method: Some(draft.payment_method.clone()),
            shipping_method: Some(draft.shipping_method.clone()),
            terms: draft.terms.clone(),
            notes: draft.notes.clone(),
            seller_id: seller_id.to_string(),
            seller_name: seller_name.to_string(),
            status: OrderStatus::Pending,
            business_status: None,
            created_at: draft.created_at,
            updated_at: now,
        }
    }
}
