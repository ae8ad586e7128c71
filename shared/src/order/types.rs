//! Value snapshots copied into drafts and orders
//!
//! Everything here is copied at save time, never referenced live: editing a
//! customer or a catalog product afterwards must not change a saved draft.

use serde::{Deserialize, Serialize};

// ============================================================================
// Customer
// ============================================================================

/// Customer kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerKind {
    /// Company (CNPJ)
    #[default]
    Company,
    /// Individual (CPF)
    Person,
}

/// Customer snapshot taken when the draft is saved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSnapshot {
    pub id: String,
    pub name: String,
    /// Tax document (CNPJ / CPF), as typed by the seller
    pub document: String,
    #[serde(default)]
    pub kind: CustomerKind,
}

// ============================================================================
// Line items
// ============================================================================

/// Product metadata copied into a line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// Product code used by the remote system
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sale unit (UN, CX, KG, M, ...)
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Units sold by weight, length, area or volume keep two decimal places.
/// Everything else is sold in whole units.
const FRACTIONAL_UNITS: &[&str] = &["KG", "G", "M", "CM", "MM", "M2", "M3", "L", "ML", "MT", "LT"];

impl ProductSnapshot {
    /// Whether this product is sold in fractional quantities
    pub fn is_fractional(&self) -> bool {
        is_fractional_unit(&self.unit)
    }
}

/// Check a unit code against the fractional unit list (case-insensitive)
pub fn is_fractional_unit(unit: &str) -> bool {
    let unit = unit.trim();
    FRACTIONAL_UNITS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(unit))
}

/// Draft line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftItem {
    pub product: ProductSnapshot,
    /// Quantity, already normalised for the product unit
    pub quantity: f64,
    pub unit_price: f64,
}

// ============================================================================
// Payment & shipping
// ============================================================================

/// How a payment method is billed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingKind {
    /// Paid on delivery / at once (cash, card, pix)
    #[default]
    Immediate,
    /// Billed in installments (boleto); requires a payment plan
    Installment,
}

/// Payment method chosen by the seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethod {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub billing: BillingKind,
}

impl PaymentMethod {
    pub fn requires_plan(&self) -> bool {
        self.billing == BillingKind::Installment
    }
}

/// Shipping method chosen by the seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingMethod {
    pub id: String,
    pub label: String,
}

/// Installment plan offered to a customer (`GET /customers/{id}/payment-plans`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentPlan {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub installments: u32,
    /// Days until the first installment is due
    #[serde(default)]
    pub first_day_offset: u32,
    /// Days between installments
    #[serde(default)]
    pub inter_day_offset: u32,
    /// Minimum order total accepted by this plan
    #[serde(default)]
    pub min_value: f64,
}

/// Installments spelled out in full by [`PaymentTerms::schedule_label`]
pub const MAX_LISTED_INSTALLMENTS: u32 = 12;

/// Payment terms copied into a draft
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    /// No installment plan applies
    #[default]
    Cash,
    Installments {
        code: String,
        description: String,
        count: u32,
        first_day_offset: u32,
        inter_day_offset: u32,
        min_value: f64,
    },
}

impl PaymentTerms {
    pub fn is_installments(&self) -> bool {
        matches!(self, Self::Installments { .. })
    }

    /// Short human-readable form, e.g. `30/60/90`
    ///
    /// Plans longer than [`MAX_LISTED_INSTALLMENTS`] are shortened to
    /// `30/60/90/…/1080 (36x)`.
    pub fn schedule_label(&self) -> Option<String> {
        match self {
            Self::Cash => None,
            Self::Installments {
                count,
                first_day_offset,
                inter_day_offset,
                ..
            } => {
                let due_day = |n: u32| {
                    u64::from(*first_day_offset)
                        .saturating_add(u64::from(n).saturating_mul(u64::from(*inter_day_offset)))
                };

                if *count <= MAX_LISTED_INSTALLMENTS {
                    let days: Vec<String> = (0..*count).map(|n| due_day(n).to_string()).collect();
                    return Some(days.join("/"));
                }

                let head: Vec<String> = (0..3).map(|n| due_day(n).to_string()).collect();
                Some(format!(
                    "{}/…/{} ({}x)",
                    head.join("/"),
                    due_day(count - 1),
                    count
                ))
            }
        }
    }
}

impl From<PaymentPlan> for PaymentTerms {
    fn from(plan: PaymentPlan) -> Self {
        Self::Installments {
            code: plan.code,
            description: plan.description,
            count: plan.installments,
            first_day_offset: plan.first_day_offset,
            inter_day_offset: plan.inter_day_offset,
            min_value: plan.min_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_units() {
        assert!(is_fractional_unit("KG"));
        assert!(is_fractional_unit("kg"));
        assert!(is_fractional_unit(" m "));
        assert!(!is_fractional_unit("UN"));
        assert!(!is_fractional_unit("CX"));
    }

    #[test]
    fn test_schedule_label() {
        let terms = PaymentTerms::Installments {
            code: "B3".to_string(),
            description: "Boleto 3x".to_string(),
            count: 3,
            first_day_offset: 30,
            inter_day_offset: 30,
            min_value: 300.0,
        };
        assert_eq!(terms.schedule_label().as_deref(), Some("30/60/90"));
        assert!(PaymentTerms::Cash.schedule_label().is_none());
    }

    fn installments(count: u32, first_day_offset: u32, inter_day_offset: u32) -> PaymentTerms {
        PaymentTerms::Installments {
            code: "B".to_string(),
            description: "Boleto".to_string(),
            count,
            first_day_offset,
            inter_day_offset,
            min_value: 0.0,
        }
    }

    #[test]
    fn test_schedule_label_wide_offsets() {
        let terms = installments(3, 30, 3_000_000_000);
        assert_eq!(
            terms.schedule_label().as_deref(),
            Some("30/3000000030/6000000030")
        );

        let label = installments(u32::MAX, u32::MAX, u32::MAX)
            .schedule_label()
            .unwrap();
        assert!(label.ends_with(&format!("({}x)", u32::MAX)));
        assert!(label.len() < 120);
    }

    #[test]
    fn test_schedule_label_long_plan_is_shortened() {
        assert_eq!(
            installments(12, 30, 30).schedule_label().unwrap().split('/').count(),
            12
        );
        assert_eq!(
            installments(36, 30, 30).schedule_label().as_deref(),
            Some("30/60/90/…/1080 (36x)")
        );
    }

    #[test]
    fn test_terms_serde_tag() {
        let json = serde_json::to_value(PaymentTerms::Cash).unwrap();
        assert_eq!(json["kind"], "CASH");

        let plan = PaymentPlan {
            code: "B1".to_string(),
            description: "Boleto 28d".to_string(),
            installments: 1,
            first_day_offset: 28,
            inter_day_offset: 0,
            min_value: 0.0,
        };
        let json = serde_json::to_value(PaymentTerms::from(plan)).unwrap();
        assert_eq!(json["kind"], "INSTALLMENTS");
        assert_eq!(json["first_day_offset"], 28);
    }
}
