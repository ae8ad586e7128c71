//! Draft input validation
//!
//! Checks run in a fixed order and the first failure wins:
//! line bounds, cart, customer, payment method, shipping method, then
//! (installment billing only) plan presence, plan minimum and plan
//! consistency.
//!
//! Lines whose quantity normalizes to zero are dropped; any other line with
//! a price or quantity outside [`money::MAX_PRICE`] / [`money::MAX_QUANTITY`]
//! rejects the whole input.

use super::error::ValidationError;
use super::money;
use shared::order::{
    CustomerSnapshot, DraftInput, DraftItem, PaymentMethod, PaymentPlan, PaymentTerms,
    ShippingMethod,
};

/// Input that passed validation, with quantities normalized and total computed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub customer: CustomerSnapshot,
    pub items: Vec<DraftItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub terms: PaymentTerms,
    pub notes: Option<String>,
}

pub fn validate_input(input: &DraftInput) -> Result<ValidatedDraft, ValidationError> {
    let items = normalize_cart(input)?;
    if items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    let customer = input
        .customer
        .as_ref()
        .filter(|c| !c.id.trim().is_empty())
        .ok_or(ValidationError::NoCustomer)?;
    let payment_method = input
        .payment
        .method
        .as_ref()
        .ok_or(ValidationError::NoPaymentMethod)?;
    let shipping_method = input
        .payment
        .shipping
        .as_ref()
        .ok_or(ValidationError::NoShippingMethod)?;

    let total = money::compute_total(&items)
        .ok_or_else(|| ValidationError::OutOfRange("order total".to_string()))?;

    let terms = if payment_method.requires_plan() {
        let plan = input
            .payment
            .plan
            .as_ref()
            .ok_or(ValidationError::NoPaymentPlan)?;
        check_plan(plan, total)?;
        PaymentTerms::from(plan.clone())
    } else {
        PaymentTerms::Cash
    };

    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ValidatedDraft {
        customer: customer.clone(),
        items,
        total,
        payment_method: payment_method.clone(),
        shipping_method: shipping_method.clone(),
        terms,
        notes,
    })
}

/// Lines with a positive quantity, quantities rounded per unit
fn normalize_cart(input: &DraftInput) -> Result<Vec<DraftItem>, ValidationError> {
    let mut items = Vec::with_capacity(input.cart.len());
    for line in &input.cart {
        let quantity = money::normalize_quantity(line.quantity, &line.product.unit);
        if quantity <= 0.0 {
            continue;
        }
        check_line(&line.product.code, quantity, line.unit_price)?;
        items.push(DraftItem {
            product: line.product.clone(),
            quantity,
            unit_price: line.unit_price,
        });
    }
    Ok(items)
}

/// Bounds for one cart line
pub fn check_line(product_code: &str, quantity: f64, unit_price: f64) -> Result<(), ValidationError> {
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(ValidationError::OutOfRange(format!(
            "{}: price must be a non-negative number, got {}",
            product_code, unit_price
        )));
    }
    if unit_price > money::MAX_PRICE {
        return Err(ValidationError::OutOfRange(format!(
            "{}: price exceeds maximum allowed ({}), got {}",
            product_code,
            money::MAX_PRICE,
            unit_price
        )));
    }
    if !quantity.is_finite() || quantity > money::MAX_QUANTITY {
        return Err(ValidationError::OutOfRange(format!(
            "{}: quantity exceeds maximum allowed ({}), got {}",
            product_code,
            money::MAX_QUANTITY,
            quantity
        )));
    }
    Ok(())
}

fn check_plan(plan: &PaymentPlan, total: f64) -> Result<(), ValidationError> {
    if money::to_decimal(total) < money::to_decimal(plan.min_value) {
        return Err(ValidationError::PlanBelowMinimum {
            total,
            minimum: plan.min_value,
        });
    }
    if plan.first_day_offset == 0 {
        return Err(ValidationError::PlanIncomplete("first installment day offset is zero"));
    }
    if plan.installments == 0 {
        return Err(ValidationError::PlanIncomplete("installment count is zero"));
    }
    if plan.installments > 1 && plan.inter_day_offset == 0 {
        return Err(ValidationError::PlanIncomplete(
            "day offset between installments is zero",
        ));
    }
    Ok(())
}
