//! Request / response bodies of the remote order API

use serde::{Deserialize, Serialize};
use shared::order::{OrderSubmission, PaymentPlan, PaymentTerms, RemoteOrder};

/// Line of `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderItem {
    pub product_code: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// Body of `POST /orders`
///
/// The backend has no columns for payment/shipping method, so those travel
/// as a summary line appended to `notes`. Plan fields are empty/zero when
/// no installment plan applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub seller_id: String,
    pub seller_name: String,
    /// Device-local order number
    pub display_id: u64,
    pub items: Vec<CreateOrderItem>,
    pub payment_plan_code: String,
    pub payment_plan_description: String,
    pub installments: u32,
    pub first_day_offset: u32,
    pub inter_day_offset: u32,
    pub min_value: f64,
    pub notes: String,
}

impl From<&OrderSubmission> for CreateOrderRequest {
    fn from(order: &OrderSubmission) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| CreateOrderItem {
                product_code: item.product.code.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        let (code, description, installments, first, inter, min_value) = match &order.terms {
            PaymentTerms::Cash => (String::new(), String::new(), 0, 0, 0, 0.0),
            PaymentTerms::Installments {
                code,
                description,
                count,
                first_day_offset,
                inter_day_offset,
                min_value,
            } => (
                code.clone(),
                description.clone(),
                *count,
                *first_day_offset,
                *inter_day_offset,
                *min_value,
            ),
        };

        Self {
            customer_id: order.customer.id.clone(),
            seller_id: order.seller_id.clone(),
            seller_name: order.seller_name.clone(),
            display_id: order.display_id,
            items,
            payment_plan_code: code,
            payment_plan_description: description,
            installments,
            first_day_offset: first,
            inter_day_offset: inter,
            min_value,
            notes: notes_with_summary(order),
        }
    }
}

/// `"Payment: Boleto (30/60/90) | Shipping: Pickup"`
pub fn payment_summary(order: &OrderSubmission) -> String {
    let payment = match (&order.terms, order.terms.schedule_label()) {
        (PaymentTerms::Installments { description, .. }, Some(schedule)) if !description.is_empty() => {
            format!("{} - {} ({})", order.payment_method.label, description, schedule)
        }
        (_, Some(schedule)) => format!("{} ({})", order.payment_method.label, schedule),
        (_, None) => order.payment_method.label.clone(),
    };
    format!(
        "Payment: {} | Shipping: {}",
        payment, order.shipping_method.label
    )
}

fn notes_with_summary(order: &OrderSubmission) -> String {
    let summary = payment_summary(order);
    match order.notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => format!("{notes}\n{summary}"),
        _ => summary,
    }
}

/// Fill missing installment fields from the customer's plan with the same code
///
/// Returns `true` when something was filled in.
pub fn fill_plan_fields(terms: &mut PaymentTerms, plans: &[PaymentPlan]) -> bool {
    let PaymentTerms::Installments {
        code,
        description,
        count,
        first_day_offset,
        inter_day_offset,
        min_value,
    } = terms
    else {
        return false;
    };
    let Some(plan) = plans.iter().find(|p| p.code == *code) else {
        return false;
    };

    let mut filled = false;
    if description.is_empty() && !plan.description.is_empty() {
        *description = plan.description.clone();
        filled = true;
    }
    if *count == 0 && plan.installments > 0 {
        *count = plan.installments;
        filled = true;
    }
    if *first_day_offset == 0 && plan.first_day_offset > 0 {
        *first_day_offset = plan.first_day_offset;
        filled = true;
    }
    if *inter_day_offset == 0 && plan.inter_day_offset > 0 {
        *inter_day_offset = plan.inter_day_offset;
        filled = true;
    }
    if *min_value == 0.0 && plan.min_value > 0.0 {
        *min_value = plan.min_value;
        filled = true;
    }
    filled
}

/// Body of a successful `POST /orders`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<Box<CreateOrderResponse>>,
}

impl CreateOrderResponse {
    /// Remote id, accepting numeric and string ids, bare or under `data`
    pub fn remote_id(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => self.data.as_ref().and_then(|inner| inner.remote_id()),
        }
    }
}

/// Error body of the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}

/// `GET /orders` answers either a bare array or `{ "data": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrderListBody {
    Bare(Vec<RemoteOrder>),
    Wrapped { data: Vec<RemoteOrder> },
}

impl OrderListBody {
    pub fn into_orders(self) -> Vec<RemoteOrder> {
        match self {
            Self::Bare(orders) | Self::Wrapped { data: orders } => orders,
        }
    }
}

/// `GET /customers/{id}/payment-plans`, same two shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PlanListBody {
    Bare(Vec<PaymentPlan>),
    Wrapped { data: Vec<PaymentPlan> },
}

impl PlanListBody {
    pub fn into_plans(self) -> Vec<PaymentPlan> {
        match self {
            Self::Bare(plans) | Self::Wrapped { data: plans } => plans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{
        BillingKind, CustomerKind, CustomerSnapshot, DraftItem, PaymentMethod, ProductSnapshot,
        ShippingMethod,
    };

    fn submission(terms: PaymentTerms, notes: Option<&str>) -> OrderSubmission {
        OrderSubmission {
            draft_id: "d-1".to_string(),
            display_id: 7,
            customer: CustomerSnapshot {
                id: "c-1".to_string(),
                name: "Mercado Central".to_string(),
                document: "12.345.678/0001-90".to_string(),
                kind: CustomerKind::Company,
            },
            seller_id: "s-1".to_string(),
            seller_name: "Ana".to_string(),
            items: vec![DraftItem {
                product: ProductSnapshot {
                    code: "P-100".to_string(),
                    name: "Arroz".to_string(),
                    description: None,
                    unit: "UN".to_string(),
                    category: None,
                },
                quantity: 3.0,
                unit_price: 10.0,
            }],
            total: 30.0,
            payment_method: PaymentMethod {
                id: "boleto".to_string(),
                label: "Boleto".to_string(),
                billing: BillingKind::Installment,
            },
            shipping_method: ShippingMethod {
                id: "pickup".to_string(),
                label: "Pickup".to_string(),
            },
            terms,
            notes: notes.map(str::to_string),
        }
    }

    fn boleto_terms() -> PaymentTerms {
        PaymentTerms::Installments {
            code: "B3".to_string(),
            description: "Boleto 3x".to_string(),
            count: 3,
            first_day_offset: 30,
            inter_day_offset: 30,
            min_value: 0.0,
        }
    }

    #[test]
    fn test_cash_request_zeroes_plan_fields() {
        let order = submission(PaymentTerms::Cash, None);
        let req = CreateOrderRequest::from(&order);
        assert_eq!(req.payment_plan_code, "");
        assert_eq!(req.installments, 0);
        assert_eq!(req.first_day_offset, 0);
        assert_eq!(req.min_value, 0.0);
        assert_eq!(req.items[0].product_code, "P-100");
        assert_eq!(req.display_id, 7);
    }

    #[test]
    fn test_installment_request_carries_plan() {
        let order = submission(boleto_terms(), Some("deliver after 2pm"));
        let req = CreateOrderRequest::from(&order);
        assert_eq!(req.payment_plan_code, "B3");
        assert_eq!(req.installments, 3);
        assert_eq!(req.inter_day_offset, 30);
        assert_eq!(
            req.notes,
            "deliver after 2pm\nPayment: Boleto - Boleto 3x (30/60/90) | Shipping: Pickup"
        );
    }

    #[test]
    fn test_summary_without_notes() {
        let order = submission(PaymentTerms::Cash, Some("   "));
        let req = CreateOrderRequest::from(&order);
        assert_eq!(req.notes, "Payment: Boleto | Shipping: Pickup");
    }

    #[test]
    fn test_fill_plan_fields() {
        let mut terms = PaymentTerms::Installments {
            code: "B3".to_string(),
            description: String::new(),
            count: 3,
            first_day_offset: 30,
            inter_day_offset: 30,
            min_value: 0.0,
        };
        let plans = vec![PaymentPlan {
            code: "B3".to_string(),
            description: "Boleto 3x".to_string(),
            installments: 3,
            first_day_offset: 30,
            inter_day_offset: 30,
            min_value: 150.0,
        }];
        assert!(fill_plan_fields(&mut terms, &plans));
        assert_eq!(terms, PaymentTerms::Installments {
            code: "B3".to_string(),
            description: "Boleto 3x".to_string(),
            count: 3,
            first_day_offset: 30,
            inter_day_offset: 30,
            min_value: 150.0,
        });

        let mut cash = PaymentTerms::Cash;
        assert!(!fill_plan_fields(&mut cash, &plans));
    }

    #[test]
    fn test_remote_id_shapes() {
        let bare: CreateOrderResponse = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(bare.remote_id().as_deref(), Some("42"));

        let text: CreateOrderResponse = serde_json::from_str(r#"{"id": "ord-9"}"#).unwrap();
        assert_eq!(text.remote_id().as_deref(), Some("ord-9"));

        let wrapped: CreateOrderResponse =
            serde_json::from_str(r#"{"data": {"id": 5}}"#).unwrap();
        assert_eq!(wrapped.remote_id().as_deref(), Some("5"));

        let none: CreateOrderResponse = serde_json::from_str("{}").unwrap();
        assert!(none.remote_id().is_none());
    }

    #[test]
    fn test_order_list_shapes() {
        let bare: OrderListBody = serde_json::from_str(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(bare.into_orders().len(), 2);

        let wrapped: OrderListBody = serde_json::from_str(r#"{"data": [{"id": 3}]}"#).unwrap();
        let orders = wrapped.into_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "3");
    }
}
