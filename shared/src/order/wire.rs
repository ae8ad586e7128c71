//! Remote-facing order shapes
//!
//! [`OrderSubmission`] is what the core hands to the submission client.
//! [`RemoteOrder`] is one entry of the remote `GET /orders` listing.

use super::draft::Draft;
use super::types::{CustomerSnapshot, DraftItem, PaymentMethod, PaymentTerms, ShippingMethod};
use serde::{Deserialize, Deserializer, Serialize};

/// Order built from a draft for one submission attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSubmission {
    pub draft_id: String,
    pub display_id: u64,
    pub customer: CustomerSnapshot,
    pub seller_id: String,
    pub seller_name: String,
    pub items: Vec<DraftItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub terms: PaymentTerms,
    pub notes: Option<String>,
}

impl OrderSubmission {
    pub fn from_draft(draft: &Draft, seller_id: &str, seller_name: &str) -> Self {
        Self {
            draft_id: draft.id.clone(),
            display_id: draft.display_id,
            customer: draft.customer.clone(),
            seller_id: seller_id.to_string(),
            seller_name: seller_name.to_string(),
            items: draft.items.clone(),
            total: draft.total,
            payment_method: draft.payment_method.clone(),
            shipping_method: draft.shipping_method.clone(),
            terms: draft.terms.clone(),
            notes: draft.notes.clone(),
        }
    }
}

/// Line of a remote order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteOrderItem {
    pub product_code: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// Order as listed by the remote system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteOrder {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub display_id: Option<u64>,
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub items: Vec<RemoteOrderItem>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub business_status: Option<String>,
    /// Epoch millis
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Accept `42` and `"42"` alike; the backend is not consistent about id types.
pub fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn opt_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
