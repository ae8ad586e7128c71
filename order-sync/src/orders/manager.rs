//! DraftsManager - draft lifecycle state machine
//!
//! ```text
//! create_or_update ──▶ DRAFT ──submit──▶ SYNCING ──ok──▶ draft deleted, order PENDING
//!                        ▲                  │
//!                        │ edit             └──fail──▶ ERROR ──submit──▶ SYNCING
//!                        └──────────────────────────────┘
//! ```
//!
//! Every transition is persisted before the next step runs: `SYNCING` is
//! written before the network call, the terminal state after it resolves.
//! A draft left in `SYNCING` by a crash is turned into `ERROR` on open.

use super::error::{DraftError, DraftResult, ValidationError};
use super::money;
use super::reconcile::ReconcileReport;
use super::storage::{OrderStorage, StorageStats};
use super::validation;
use sales_client::{OrderGateway, SubmitReceipt};
use shared::order::{
    Draft, DraftEvent, DraftInput, DraftStatus, LocalOrder, OrderStatus, OrderSubmission,
};
use shared::util::{new_local_id, now_millis};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Message stored on drafts whose submission was cut short by a restart
pub const INTERRUPTED_MESSAGE: &str = "Submission interrupted; reconcile before retrying";

/// Message stored on drafts the server accepted but local storage failed to record
pub const UNRECORDED_MESSAGE: &str = "Order accepted but not recorded locally; reconcile before retrying";

/// Seller the device submits orders for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerIdentity {
    pub id: String,
    pub name: String,
}

/// Removes a draft id from the in-flight set when dropped
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    draft_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.draft_id);
    }
}

/// Draft lifecycle controller
pub struct DraftsManager {
    storage: OrderStorage,
    gateway: Arc<dyn OrderGateway>,
    seller: SellerIdentity,
    /// Drafts with a submission running in this process
    in_flight: Mutex<HashSet<String>>,
    event_tx: broadcast::Sender<DraftEvent>,
}

impl std::fmt::Debug for DraftsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftsManager")
            .field("storage", &"<OrderStorage>")
            .field("gateway", &"<OrderGateway>")
            .field("seller", &self.seller)
            .finish()
    }
}

impl DraftsManager {
    /// Open storage at `db_path` and recover interrupted submissions
    pub fn new(
        db_path: impl AsRef<Path>,
        gateway: Arc<dyn OrderGateway>,
        seller: SellerIdentity,
    ) -> DraftResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        let manager = Self::with_storage(storage, gateway, seller);
        let recovered = manager.recover_interrupted()?;
        tracing::info!(
            seller_id = %manager.seller.id,
            recovered,
            "DraftsManager started"
        );
        Ok(manager)
    }

    /// Create a manager over existing storage (no recovery pass)
    pub fn with_storage(
        storage: OrderStorage,
        gateway: Arc<dyn OrderGateway>,
        seller: SellerIdentity,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            gateway,
            seller,
            in_flight: Mutex::new(HashSet::new()),
            event_tx,
        }
    }

    /// Subscribe to draft events
    pub fn subscribe(&self) -> broadcast::Receiver<DraftEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    pub fn seller(&self) -> &SellerIdentity {
        &self.seller
    }

    fn emit(&self, event: DraftEvent) {
        let _ = self.event_tx.send(event);
    }

    // ========== Drafts ==========

    /// Validate and persist a draft
    ///
    /// A new draft reserves a display id; an existing one keeps its display
    /// id, creation time and retry count. Saving a failed draft returns it
    /// to `DRAFT`.
    pub fn create_or_update(&self, input: DraftInput) -> DraftResult<Draft> {
        let validated = validation::validate_input(&input)?;
        let now = now_millis();

        let draft = {
            let in_flight = self.in_flight.lock();

            let (id, display_id, created_at, retry_count) = match &input.draft_id {
                Some(id) => {
                    if in_flight.contains(id) {
                        return Err(DraftError::InFlight(id.clone()));
                    }
                    let existing = self
                        .storage
                        .get_draft(id)?
                        .ok_or_else(|| DraftError::NotFound(id.clone()))?;
                    if existing.is_in_flight() {
                        return Err(DraftError::InFlight(id.clone()));
                    }
                    (
                        existing.id,
                        existing.display_id,
                        existing.created_at,
                        existing.retry_count,
                    )
                }
                None => (new_local_id(), self.storage.next_display_id()?, now, 0),
            };

            let draft = Draft {
                id,
                display_id,
                customer: validated.customer,
                items: validated.items,
                total: validated.total,
                payment_method: validated.payment_method,
                shipping_method: validated.shipping_method,
                terms: validated.terms,
                notes: validated.notes,
                status: DraftStatus::Draft,
                retry_count,
                error_message: None,
                created_at,
                updated_at: now,
            };
            self.storage.put_draft(&draft)?;
            draft
        };

        tracing::info!(
            draft_id = %draft.id,
            display_id = draft.display_id,
            items = draft.item_count(),
            total = draft.total,
            "Draft saved"
        );
        self.emit(DraftEvent::Saved {
            draft_id: draft.id.clone(),
            display_id: draft.display_id,
        });
        Ok(draft)
    }

    /// Change one line's quantity by `delta`, applying the unit's rounding
    ///
    /// A line that reaches zero is removed; removing the last line fails
    /// with `EmptyCart` and leaves the draft untouched. An unknown product
    /// code fails with `ItemNotFound` without writing.
    pub fn adjust_item_quantity(
        &self,
        draft_id: &str,
        product_code: &str,
        delta: f64,
    ) -> DraftResult<Draft> {
        let draft = {
            let in_flight = self.in_flight.lock();
            if in_flight.contains(draft_id) {
                return Err(DraftError::InFlight(draft_id.to_string()));
            }
            let mut draft = self
                .storage
                .get_draft(draft_id)?
                .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
            if draft.is_in_flight() {
                return Err(DraftError::InFlight(draft_id.to_string()));
            }

            if !delta.is_finite() || delta.abs() > money::MAX_QUANTITY {
                return Err(ValidationError::OutOfRange(format!(
                    "{}: adjustment must be within ±{}, got {}",
                    product_code,
                    money::MAX_QUANTITY,
                    delta
                ))
                .into());
            }

            let mut matched = false;
            for item in draft
                .items
                .iter_mut()
                .filter(|item| item.product.code == product_code)
            {
                item.quantity = money::adjust_quantity(item.quantity, delta, &item.product.unit);
                validation::check_line(&item.product.code, item.quantity, item.unit_price)?;
                matched = true;
            }
            if !matched {
                return Err(DraftError::ItemNotFound {
                    draft_id: draft_id.to_string(),
                    product_code: product_code.to_string(),
                });
            }
            draft.items.retain(|item| item.quantity > 0.0);
            if draft.items.is_empty() {
                return Err(ValidationError::EmptyCart.into());
            }

            draft.total = money::compute_total(&draft.items)
                .ok_or_else(|| ValidationError::OutOfRange("order total".to_string()))?;
            draft.status = DraftStatus::Draft;
            draft.error_message = None;
            draft.updated_at = now_millis();
            self.storage.put_draft(&draft)?;
            draft
        };

        tracing::debug!(draft_id = %draft.id, product_code, delta, total = draft.total, "Draft quantity adjusted");
        self.emit(DraftEvent::Saved {
            draft_id: draft.id.clone(),
            display_id: draft.display_id,
        });
        Ok(draft)
    }

    /// All drafts, most recently updated first
    pub fn list_drafts(&self) -> DraftResult<Vec<Draft>> {
        Ok(self.storage.list_drafts()?)
    }

    pub fn get_draft(&self, draft_id: &str) -> DraftResult<Option<Draft>> {
        Ok(self.storage.get_draft(draft_id)?)
    }

    /// Delete a draft; a missing id is a no-op, an in-flight draft is rejected
    pub fn discard(&self, draft_id: &str) -> DraftResult<()> {
        {
            let in_flight = self.in_flight.lock();
            if in_flight.contains(draft_id) {
                return Err(DraftError::InFlight(draft_id.to_string()));
            }
            match self.storage.get_draft(draft_id)? {
                Some(draft) if draft.is_in_flight() => {
                    return Err(DraftError::InFlight(draft_id.to_string()));
                }
                Some(_) => {
                    self.storage.delete_draft(draft_id)?;
                }
                None => {
                    tracing::debug!(draft_id, "Discard of unknown draft ignored");
                    return Ok(());
                }
            }
        }

        tracing::info!(draft_id, "Draft discarded");
        self.emit(DraftEvent::Discarded {
            draft_id: draft_id.to_string(),
        });
        Ok(())
    }

    // ========== Submission ==========

    /// Submit a draft to the remote system
    ///
    /// At most one submission per draft runs at a time; a second call while
    /// one is in flight is rejected without a network request.
    ///
    /// If recording the outcome fails after the network call, the draft is
    /// moved to `ERROR` on a best-effort basis and the storage error is
    /// returned. When that write fails too, the draft stays `SYNCING` until
    /// the next open runs recovery.
    pub async fn submit(&self, draft_id: &str) -> DraftResult<SubmitReceipt> {
        let (draft, _guard) = {
            let mut in_flight = self.in_flight.lock();
            if in_flight.contains(draft_id) {
                tracing::warn!(draft_id, "Concurrent submit rejected");
                return Err(DraftError::InFlight(draft_id.to_string()));
            }
            let mut draft = self
                .storage
                .get_draft(draft_id)?
                .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
            if draft.is_in_flight() {
                tracing::warn!(draft_id, "Draft already SYNCING, submit rejected");
                return Err(DraftError::InFlight(draft_id.to_string()));
            }

            draft.status = DraftStatus::Syncing;
            draft.error_message = None;
            draft.updated_at = now_millis();
            self.storage.put_draft(&draft)?;

            in_flight.insert(draft_id.to_string());
            let guard = InFlightGuard {
                set: &self.in_flight,
                draft_id: draft_id.to_string(),
            };
            (draft, guard)
        };

        self.emit(DraftEvent::Submitting {
            draft_id: draft.id.clone(),
        });
        tracing::info!(
            draft_id = %draft.id,
            display_id = draft.display_id,
            attempt = draft.retry_count + 1,
            "Submitting draft"
        );

        let order = OrderSubmission::from_draft(&draft, &self.seller.id, &self.seller.name);
        match self.gateway.submit_order(&order).await {
            Ok(receipt) => {
                let local = LocalOrder::from_submitted(
                    &draft,
                    receipt.remote_id.clone(),
                    &self.seller.id,
                    &self.seller.name,
                    now_millis(),
                );
                if let Err(e) = self.storage.complete_submission(&draft.id, &local) {
                    tracing::error!(
                        draft_id = %draft.id,
                        order_id = %local.id,
                        error = %e,
                        "Accepted order could not be recorded"
                    );
                    self.fail_after_storage_error(&draft.id, UNRECORDED_MESSAGE);
                    return Err(e.into());
                }

                tracing::info!(
                    draft_id = %draft.id,
                    order_id = %local.id,
                    display_id = draft.display_id,
                    "Draft submitted"
                );
                self.emit(DraftEvent::Submitted {
                    draft_id: draft.id.clone(),
                    order_id: local.id,
                });
                Ok(receipt)
            }
            Err(e) => {
                let message = e.to_string();
                let failed = match self.storage.mark_draft_failed(&draft.id, &message, now_millis()) {
                    Ok(failed) => failed,
                    Err(store_err) => {
                        tracing::error!(
                            draft_id = %draft.id,
                            error = %store_err,
                            "Failed submission could not be recorded"
                        );
                        self.fail_after_storage_error(&draft.id, &message);
                        return Err(store_err.into());
                    }
                };

                tracing::warn!(
                    draft_id = %draft.id,
                    retry_count = failed.retry_count,
                    transient = e.is_transient(),
                    error = %message,
                    "Draft submission failed"
                );
                self.emit(DraftEvent::Failed {
                    draft_id: draft.id.clone(),
                    message,
                    retry_count: failed.retry_count,
                });
                Err(DraftError::Submission {
                    source: e,
                    retry_count: failed.retry_count,
                })
            }
        }
    }

    /// Best-effort `ERROR` write once recording a submission outcome failed
    fn fail_after_storage_error(&self, draft_id: &str, message: &str) {
        match self.storage.mark_draft_failed(draft_id, message, now_millis()) {
            Ok(failed) => self.emit(DraftEvent::Failed {
                draft_id: draft_id.to_string(),
                message: message.to_string(),
                retry_count: failed.retry_count,
            }),
            Err(e) => tracing::error!(
                draft_id,
                error = %e,
                "Draft left SYNCING until the next recovery pass"
            ),
        }
    }

    /// Turn drafts left `SYNCING` by a previous run into `ERROR`
    ///
    /// Returns the number of drafts recovered.
    pub fn recover_interrupted(&self) -> DraftResult<usize> {
        let recovered = self
            .storage
            .recover_interrupted(INTERRUPTED_MESSAGE, now_millis())?;

        for draft in &recovered {
            tracing::warn!(
                draft_id = %draft.id,
                display_id = draft.display_id,
                retry_count = draft.retry_count,
                "Recovered interrupted submission"
            );
            self.emit(DraftEvent::Failed {
                draft_id: draft.id.clone(),
                message: INTERRUPTED_MESSAGE.to_string(),
                retry_count: draft.retry_count,
            });
        }
        Ok(recovered.len())
    }

    // ========== Orders ==========

    /// Pull the remote order list into local storage
    pub async fn reconcile(&self) -> DraftResult<ReconcileReport> {
        let started = std::time::Instant::now();
        let remote = self.gateway.list_orders().await?;
        let report = self.storage.reconcile_orders(&remote, now_millis())?;

        tracing::info!(
            merged = report.merged,
            adopted = report.adopted,
            display_conflicts = report.display_conflicts,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reconcile finished"
        );
        Ok(report)
    }

    /// All local orders, newest first
    pub fn list_orders(&self) -> DraftResult<Vec<LocalOrder>> {
        Ok(self.storage.list_orders()?)
    }

    /// Orders submitted from this device and not yet confirmed remotely
    pub fn pending_orders(&self) -> DraftResult<Vec<LocalOrder>> {
        Ok(self.storage.orders_with_status(OrderStatus::Pending)?)
    }

    pub fn stats(&self) -> DraftResult<StorageStats> {
        Ok(self.storage.get_stats()?)
    }
}
