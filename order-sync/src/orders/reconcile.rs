//! Pending/Synced reconciliation
//!
//! The remote order list is authoritative. Each remote order is merged into
//! the local record with the same id: remote fields overwrite local ones,
//! local-only data (customer snapshot, payment selection, display id when the
//! remote has none) is kept. Local orders missing from the remote list are
//! left alone.

use serde::{Deserialize, Serialize};
use shared::order::{DraftItem, LocalOrder, OrderStatus, ProductSnapshot, RemoteOrder};

/// Result of one reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Remote orders upserted into local storage
    pub merged: usize,
    /// Anonymous local submissions matched to their remote order
    pub adopted: usize,
    /// Remote orders stored without a display-id index entry
    pub display_conflicts: usize,
}

/// Merge a remote order over the local record with the same id
pub fn merge_remote_order(existing: Option<&LocalOrder>, remote: &RemoteOrder, now: i64) -> LocalOrder {
    let items = merge_items(existing.map(|o| o.items.as_slice()).unwrap_or(&[]), remote);

    match existing {
        Some(local) => LocalOrder {
            id: remote.id.clone(),
            display_id: remote.display_id.or(local.display_id),
            draft_id: local.draft_id.clone(),
            customer: local.customer.clone(),
            customer_id: remote.customer_id.clone().or_else(|| local.customer_id.clone()),
            items,
            total: remote.total.unwrap_or(local.total),
            payment_method: local.payment_method.clone(),
            shipping_method: local.shipping_method.clone(),
            terms: local.terms.clone(),
            notes: remote.notes.clone().or_else(|| local.notes.clone()),
            seller_id: remote.seller_id.clone().unwrap_or_else(|| local.seller_id.clone()),
            seller_name: remote
                .seller_name
                .clone()
                .unwrap_or_else(|| local.seller_name.clone()),
            status: OrderStatus::Synced,
            business_status: remote.business_status.clone(),
            created_at: remote.created_at.unwrap_or(local.created_at),
            updated_at: now,
        },
        None => LocalOrder {
            id: remote.id.clone(),
            display_id: remote.display_id,
            draft_id: None,
            customer: None,
            customer_id: remote.customer_id.clone(),
            items,
            total: remote.total.unwrap_or_default(),
            payment_method: None,
            shipping_method: None,
            terms: Default::default(),
            notes: remote.notes.clone(),
            seller_id: remote.seller_id.clone().unwrap_or_default(),
            seller_name: remote.seller_name.clone().unwrap_or_default(),
            status: OrderStatus::Synced,
            business_status: remote.business_status.clone(),
            created_at: remote.created_at.unwrap_or(now),
            updated_at: now,
        },
    }
}

/// Remote lines win; product snapshots are reused when the code matches
fn merge_items(local: &[DraftItem], remote: &RemoteOrder) -> Vec<DraftItem> {
    if remote.items.is_empty() {
        return local.to_vec();
    }
    remote
        .items
        .iter()
        .map(|line| {
            let product = local
                .iter()
                .find(|item| item.product.code == line.product_code)
                .map(|item| item.product.clone())
                .unwrap_or_else(|| ProductSnapshot {
                    code: line.product_code.clone(),
                    name: line.product_code.clone(),
                    description: None,
                    unit: String::new(),
                    category: None,
                });
            DraftItem {
                product,
                quantity: line.quantity,
                unit_price: line.unit_price,
            }
        })
        .collect()
}

/// Whether `local` is an anonymous submission of the same order as `remote`
///
/// An accepted submission whose response carried no id is stored under its
/// draft id. When the remote listing shows an order with the same display id
/// from the same seller, it is that submission.
pub fn is_same_submission(local: &LocalOrder, remote: &RemoteOrder) -> bool {
    let anonymous = local.status == OrderStatus::Pending
        && local.draft_id.as_deref() == Some(local.id.as_str());
    let same_seller = remote
        .seller_id
        .as_deref()
        .is_none_or(|seller| seller == local.seller_id);
    anonymous && same_seller && local.display_id.is_some() && local.display_id == remote.display_id
}
