//! redb-based storage for drafts, local orders and the order-number sequence
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `drafts` | `draft_id` | `Draft` (JSON) | Draft store |
//! | `orders` | `order_id` | `LocalOrder` (JSON) | Submitted / reconciled orders |
//! | `order_display_ids` | `display_id` | `order_id` | Unique display-id index |
//! | `order_status` | `status` | `order_id` (multimap) | Pending lookup |
//! | `sequence` | `"last_order_id"` | `u64` | Sequence generator |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns the
//! write survives power loss. Every multi-step change (submission outcome,
//! reconcile pass, crash recovery) is one write transaction.

use super::reconcile::{self, ReconcileReport};
use redb::{
    Database, MultimapTableDefinition, ReadableDatabase, ReadableMultimapTable, ReadableTable,
    ReadableTableMetadata, TableDefinition, WriteTransaction,
};
use shared::order::{Draft, DraftStatus, LocalOrder, OrderStatus, RemoteOrder};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Drafts: key = draft_id, value = JSON-serialized Draft
const DRAFTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("drafts");

/// Orders: key = order_id, value = JSON-serialized LocalOrder
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Display-id uniqueness index: key = display_id, value = order_id
const DISPLAY_IDS_TABLE: TableDefinition<u64, &str> = TableDefinition::new("order_display_ids");

/// Status index: key = status, values = order_ids
const ORDER_STATUS_TABLE: MultimapTableDefinition<&str, &str> =
    MultimapTableDefinition::new("order_status");

/// Counters: key = counter name, value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence");

const LAST_ORDER_ID_KEY: &str = "last_order_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Draft not found: {0}")]
    DraftNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Local storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    /// Write raw bytes under an order id (for testing unreadable records)
    #[cfg(test)]
    pub(crate) fn put_raw_order(&self, order_id: &str, bytes: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            table.insert(order_id, bytes)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DRAFTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(DISPLAY_IDS_TABLE)?;
            let _ = write_txn.open_multimap_table(ORDER_STATUS_TABLE)?;
            // The counter stays absent until the first call seeds it
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Sequence Generator ==========

    /// Reserve the next display id
    ///
    /// Read, seed and write happen in one write transaction; redb allows a
    /// single writer at a time, so concurrent callers never share a value.
    /// On first use the counter is seeded one above the highest display id
    /// found in orders and drafts.
    pub fn next_display_id(&self) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let current = {
            let table = txn.open_table(SEQUENCE_TABLE)?;
            table.get(LAST_ORDER_ID_KEY)?.map(|g| g.value())
        };
        let current = match current {
            Some(value) => value,
            None => {
                let seed = Self::max_display_id_txn(&txn)?;
                tracing::info!(seed, "Seeding order sequence");
                seed
            }
        };
        let next = current + 1;
        {
            let mut table = txn.open_table(SEQUENCE_TABLE)?;
            table.insert(LAST_ORDER_ID_KEY, next)?;
        }
        txn.commit()?;
        Ok(next)
    }

    /// Last reserved display id (0 if none yet)
    pub fn last_display_id(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table.get(LAST_ORDER_ID_KEY)?.map(|g| g.value()).unwrap_or(0))
    }

    fn max_display_id_txn(txn: &WriteTransaction) -> StorageResult<u64> {
        let from_orders = {
            let index = txn.open_table(DISPLAY_IDS_TABLE)?;
            index.last()?.map(|(k, _)| k.value()).unwrap_or(0)
        };

        let mut from_drafts = 0;
        let drafts = txn.open_table(DRAFTS_TABLE)?;
        for result in drafts.iter()? {
            let (_key, value) = result?;
            let draft: Draft = serde_json::from_slice(value.value())?;
            from_drafts = from_drafts.max(draft.display_id);
        }

        Ok(from_orders.max(from_drafts))
    }

    // ========== Drafts ==========

    /// Insert or replace a draft
    pub fn put_draft(&self, draft: &Draft) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DRAFTS_TABLE)?;
            let value = serde_json::to_vec(draft)?;
            table.insert(draft.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a draft by id
    pub fn get_draft(&self, draft_id: &str) -> StorageResult<Option<Draft>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DRAFTS_TABLE)?;

        match table.get(draft_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All drafts, most recently updated first
    pub fn list_drafts(&self) -> StorageResult<Vec<Draft>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DRAFTS_TABLE)?;

        let mut drafts = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let draft: Draft = serde_json::from_slice(value.value())?;
            drafts.push(draft);
        }

        drafts.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.display_id.cmp(&a.display_id))
        });
        Ok(drafts)
    }

    /// Delete a draft, returning whether it existed
    pub fn delete_draft(&self, draft_id: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(DRAFTS_TABLE)?;
            table.remove(draft_id)?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    /// Persist a failed attempt: `ERROR`, message, `retry_count + 1`
    pub fn mark_draft_failed(&self, draft_id: &str, message: &str, now: i64) -> StorageResult<Draft> {
        let txn = self.db.begin_write()?;
        let draft = {
            let mut table = txn.open_table(DRAFTS_TABLE)?;
            let mut draft: Draft = match table.get(draft_id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(StorageError::DraftNotFound(draft_id.to_string())),
            };
            draft.status = DraftStatus::Error;
            draft.error_message = Some(message.to_string());
            draft.retry_count += 1;
            draft.updated_at = now;
            let value = serde_json::to_vec(&draft)?;
            table.insert(draft_id, value.as_slice())?;
            draft
        };
        txn.commit()?;
        Ok(draft)
    }

    /// Turn drafts left in `SYNCING` by a previous process into `ERROR`
    ///
    /// Returns the recovered drafts. Nothing is ever marked synced here; only
    /// a remote listing can confirm an order.
    pub fn recover_interrupted(&self, message: &str, now: i64) -> StorageResult<Vec<Draft>> {
        let txn = self.db.begin_write()?;
        let recovered = {
            let mut table = txn.open_table(DRAFTS_TABLE)?;

            let mut stuck = Vec::new();
            for result in table.iter()? {
                let (_key, value) = result?;
                let draft: Draft = serde_json::from_slice(value.value())?;
                if draft.status == DraftStatus::Syncing {
                    stuck.push(draft);
                }
            }

            for draft in &mut stuck {
                draft.status = DraftStatus::Error;
                draft.error_message = Some(message.to_string());
                draft.retry_count += 1;
                draft.updated_at = now;
                let value = serde_json::to_vec(&*draft)?;
                table.insert(draft.id.as_str(), value.as_slice())?;
            }
            stuck
        };
        txn.commit()?;
        Ok(recovered)
    }

    // ========== Orders ==========

    /// Record an accepted submission: delete the draft and store the order
    ///
    /// One transaction, so a crash leaves either the draft or the order.
    pub fn complete_submission(&self, draft_id: &str, order: &LocalOrder) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut drafts = txn.open_table(DRAFTS_TABLE)?;
            drafts.remove(draft_id)?;
        }
        let existing = Self::get_order_txn(&txn, &order.id)?;
        if existing
            .as_ref()
            .is_some_and(|o| o.status == OrderStatus::Synced)
        {
            // A reconcile pass already brought in the confirmed order
            tracing::debug!(order_id = %order.id, "Order already synced, keeping remote copy");
        } else if !Self::write_order_txn(&txn, order, existing.as_ref())? {
            tracing::warn!(
                order_id = %order.id,
                display_id = ?order.display_id,
                "Display id already indexed for another order"
            );
        }
        txn.commit()?;
        Ok(())
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<LocalOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up an order through the display-id index
    pub fn get_order_by_display_id(&self, display_id: u64) -> StorageResult<Option<LocalOrder>> {
        let order_id = {
            let read_txn = self.db.begin_read()?;
            let index = read_txn.open_table(DISPLAY_IDS_TABLE)?;
            index.get(display_id)?.map(|g| g.value().to_string())
        };
        match order_id {
            Some(id) => self.get_order(&id),
            None => Ok(None),
        }
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> StorageResult<Vec<LocalOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: LocalOrder = serde_json::from_slice(value.value())?;
            orders.push(order);
        }

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders with the given status, via the status index
    pub fn orders_with_status(&self, status: OrderStatus) -> StorageResult<Vec<LocalOrder>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(ORDER_STATUS_TABLE)?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index.get(status.as_str())? {
            let id = result?;
            if let Some(value) = table.get(id.value())? {
                let order: LocalOrder = serde_json::from_slice(value.value())?;
                orders.push(order);
            }
        }

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Merge the remote order list into local storage in one transaction
    pub fn reconcile_orders(&self, remote: &[RemoteOrder], now: i64) -> StorageResult<ReconcileReport> {
        let txn = self.db.begin_write()?;
        let mut report = ReconcileReport::default();

        for remote_order in remote {
            let mut existing = Self::get_order_txn(&txn, &remote_order.id)?;

            if existing.is_none()
                && let Some(display_id) = remote_order.display_id
                && let Some(anonymous) = Self::order_by_display_id_txn(&txn, display_id)?
                && reconcile::is_same_submission(&anonymous, remote_order)
            {
                // Accepted earlier without an id; move it under the remote id
                Self::remove_order_txn(&txn, &anonymous)?;
                tracing::info!(
                    draft_id = %anonymous.id,
                    order_id = %remote_order.id,
                    display_id,
                    "Matched anonymous submission to remote order"
                );
                existing = Some(anonymous);
                report.adopted += 1;
            }

            let merged = reconcile::merge_remote_order(existing.as_ref(), remote_order, now);
            let previous = Self::get_order_txn(&txn, &merged.id)?;
            if !Self::write_order_txn(&txn, &merged, previous.as_ref())? {
                tracing::warn!(
                    order_id = %merged.id,
                    display_id = ?merged.display_id,
                    "Remote order shares a display id with another local order"
                );
                report.display_conflicts += 1;
            }
            report.merged += 1;
        }

        txn.commit()?;
        Ok(report)
    }

    fn get_order_txn(txn: &WriteTransaction, order_id: &str) -> StorageResult<Option<LocalOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn order_by_display_id_txn(
        txn: &WriteTransaction,
        display_id: u64,
    ) -> StorageResult<Option<LocalOrder>> {
        let order_id = {
            let index = txn.open_table(DISPLAY_IDS_TABLE)?;
            index.get(display_id)?.map(|g| g.value().to_string())
        };
        match order_id {
            Some(id) => Self::get_order_txn(txn, &id),
            None => Ok(None),
        }
    }

    /// Write an order and keep both indexes in step
    ///
    /// Returns `false` when the display id is already indexed for a different
    /// order; the order is then stored without an index entry.
    fn write_order_txn(
        txn: &WriteTransaction,
        order: &LocalOrder,
        previous: Option<&LocalOrder>,
    ) -> StorageResult<bool> {
        {
            let mut status_index = txn.open_multimap_table(ORDER_STATUS_TABLE)?;
            if let Some(prev) = previous {
                status_index.remove(prev.status.as_str(), prev.id.as_str())?;
            }
            status_index.insert(order.status.as_str(), order.id.as_str())?;
        }

        let indexed = {
            let mut display_index = txn.open_table(DISPLAY_IDS_TABLE)?;
            if let Some(prev_display) = previous.and_then(|p| p.display_id)
                && Some(prev_display) != order.display_id
            {
                let owned = display_index
                    .get(prev_display)?
                    .is_some_and(|g| g.value() == order.id);
                if owned {
                    display_index.remove(prev_display)?;
                }
            }

            match order.display_id {
                Some(display_id) => {
                    let owner = display_index.get(display_id)?.map(|g| g.value().to_string());
                    match owner {
                        Some(owner) if owner != order.id => false,
                        _ => {
                            display_index.insert(display_id, order.id.as_str())?;
                            true
                        }
                    }
                }
                None => true,
            }
        };

        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        Ok(indexed)
    }

    fn remove_order_txn(txn: &WriteTransaction, order: &LocalOrder) -> StorageResult<()> {
        {
            let mut status_index = txn.open_multimap_table(ORDER_STATUS_TABLE)?;
            status_index.remove(order.status.as_str(), order.id.as_str())?;
        }
        if let Some(display_id) = order.display_id {
            let mut display_index = txn.open_table(DISPLAY_IDS_TABLE)?;
            let owned = display_index
                .get(display_id)?
                .is_some_and(|g| g.value() == order.id);
            if owned {
                display_index.remove(display_id)?;
            }
        }
        let mut table = txn.open_table(ORDERS_TABLE)?;
        table.remove(order.id.as_str())?;
        Ok(())
    }

    // ========== Statistics ==========

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let drafts = read_txn.open_table(DRAFTS_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let status_index = read_txn.open_multimap_table(ORDER_STATUS_TABLE)?;
        let seq_table = read_txn.open_table(SEQUENCE_TABLE)?;

        let mut draft_count = 0;
        let mut failed_draft_count = 0;
        for result in drafts.iter()? {
            let (_key, value) = result?;
            let draft: Draft = serde_json::from_slice(value.value())?;
            draft_count += 1;
            if draft.status == DraftStatus::Error {
                failed_draft_count += 1;
            }
        }

        let mut pending_order_count = 0;
        for result in status_index.get(OrderStatus::Pending.as_str())? {
            result?;
            pending_order_count += 1;
        }

        Ok(StorageStats {
            draft_count,
            failed_draft_count,
            order_count: orders.len()?,
            pending_order_count,
            last_display_id: seq_table
                .get(LAST_ORDER_ID_KEY)?
                .map(|g| g.value())
                .unwrap_or(0),
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub draft_count: u64,
    pub failed_draft_count: u64,
    pub order_count: u64,
    pub pending_order_count: u64,
    pub last_display_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{
        BillingKind, CustomerKind, CustomerSnapshot, DraftItem, PaymentMethod, PaymentTerms,
        ProductSnapshot, ShippingMethod,
    };
    use std::collections::HashSet;

    fn create_test_draft(id: &str, display_id: u64, updated_at: i64) -> Draft {
        Draft {
            id: id.to_string(),
            display_id,
            customer: CustomerSnapshot {
                id: "c-1".to_string(),
                name: "Mercado Central".to_string(),
                document: "12.345.678/0001-90".to_string(),
                kind: CustomerKind::Company,
            },
            items: vec![DraftItem {
                product: ProductSnapshot {
                    code: "P-1".to_string(),
                    name: "Feijão".to_string(),
                    description: None,
                    unit: "UN".to_string(),
                    category: None,
                },
                quantity: 2.0,
                unit_price: 8.5,
            }],
            total: 17.0,
            payment_method: PaymentMethod {
                id: "cash".to_string(),
                label: "Cash".to_string(),
                billing: BillingKind::Immediate,
            },
            shipping_method: ShippingMethod {
                id: "pickup".to_string(),
                label: "Pickup".to_string(),
            },
            terms: PaymentTerms::Cash,
            notes: None,
            status: DraftStatus::Draft,
            retry_count: 0,
            error_message: None,
            created_at: updated_at,
            updated_at,
        }
    }

    fn create_test_order(id: &str, display_id: Option<u64>, status: OrderStatus) -> LocalOrder {
        LocalOrder {
            id: id.to_string(),
            display_id,
            draft_id: None,
            customer: None,
            customer_id: Some("c-1".to_string()),
            items: vec![],
            total: 10.0,
            payment_method: None,
            shipping_method: None,
            terms: PaymentTerms::Cash,
            notes: None,
            seller_id: "s-1".to_string(),
            seller_name: "Ana".to_string(),
            status,
            business_status: None,
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    fn remote(id: &str, display_id: Option<u64>) -> RemoteOrder {
        RemoteOrder {
            id: id.to_string(),
            display_id,
            customer_id: Some("c-1".to_string()),
            seller_id: Some("s-1".to_string()),
            seller_name: Some("Ana".to_string()),
            items: vec![],
            total: Some(99.0),
            notes: None,
            business_status: Some("NEW".to_string()),
            created_at: Some(2_000),
        }
    }

    #[test]
    fn test_sequence_starts_at_one() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert_eq!(storage.last_display_id().unwrap(), 0);
        assert_eq!(storage.next_display_id().unwrap(), 1);
        assert_eq!(storage.next_display_id().unwrap(), 2);
        assert_eq!(storage.last_display_id().unwrap(), 2);
    }

    #[test]
    fn test_sequence_seeds_from_orders_and_drafts() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage
            .complete_submission("gone", &create_test_order("o-1", Some(17), OrderStatus::Pending))
            .unwrap();
        storage.put_draft(&create_test_draft("d-1", 21, 1)).unwrap();

        assert_eq!(storage.next_display_id().unwrap(), 22);
    }

    #[test]
    fn test_sequence_concurrent_callers_get_distinct_values() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    let mut mine = Vec::new();
                    for _ in 0..25 {
                        mine.push(storage.next_display_id().unwrap());
                    }
                    mine
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in threads {
            let mine = handle.join().unwrap();
            // each caller sees strictly increasing values
            assert!(mine.windows(2).all(|w| w[0] < w[1]));
            all.extend(mine);
        }

        let distinct: HashSet<u64> = all.iter().copied().collect();
        assert_eq!(distinct.len(), 200);
        assert_eq!(all.iter().copied().max(), Some(200));
        assert_eq!(all.iter().copied().min(), Some(1));
    }

    #[test]
    fn test_draft_crud_and_ordering() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.put_draft(&create_test_draft("a", 1, 100)).unwrap();
        storage.put_draft(&create_test_draft("b", 2, 300)).unwrap();
        storage.put_draft(&create_test_draft("c", 3, 200)).unwrap();

        let ids: Vec<String> = storage.list_drafts().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        assert!(storage.get_draft("a").unwrap().is_some());
        assert!(storage.delete_draft("a").unwrap());
        assert!(!storage.delete_draft("a").unwrap());
        assert!(storage.get_draft("a").unwrap().is_none());
    }

    #[test]
    fn test_mark_draft_failed() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut draft = create_test_draft("a", 1, 100);
        draft.status = DraftStatus::Syncing;
        storage.put_draft(&draft).unwrap();

        let failed = storage.mark_draft_failed("a", "timeout", 500).unwrap();
        assert_eq!(failed.status, DraftStatus::Error);
        assert_eq!(failed.retry_count, 1);
        assert_eq!(failed.error_message.as_deref(), Some("timeout"));
        assert_eq!(storage.get_draft("a").unwrap().unwrap(), failed);

        assert!(matches!(
            storage.mark_draft_failed("missing", "x", 1),
            Err(StorageError::DraftNotFound(_))
        ));
    }

    #[test]
    fn test_recover_interrupted_only_touches_syncing() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut stuck = create_test_draft("stuck", 1, 100);
        stuck.status = DraftStatus::Syncing;
        storage.put_draft(&stuck).unwrap();
        storage.put_draft(&create_test_draft("idle", 2, 100)).unwrap();

        let recovered = storage.recover_interrupted("interrupted", 900).unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].id, "stuck");

        let stuck = storage.get_draft("stuck").unwrap().unwrap();
        assert_eq!(stuck.status, DraftStatus::Error);
        assert_eq!(stuck.retry_count, 1);
        assert_eq!(storage.get_draft("idle").unwrap().unwrap().status, DraftStatus::Draft);

        // second run is a no-op
        assert!(storage.recover_interrupted("interrupted", 901).unwrap().is_empty());
    }

    #[test]
    fn test_complete_submission_is_atomic_swap() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.put_draft(&create_test_draft("d-1", 5, 100)).unwrap();

        let order = create_test_order("42", Some(5), OrderStatus::Pending);
        storage.complete_submission("d-1", &order).unwrap();

        assert!(storage.get_draft("d-1").unwrap().is_none());
        assert_eq!(storage.get_order("42").unwrap(), Some(order.clone()));
        assert_eq!(storage.get_order_by_display_id(5).unwrap(), Some(order));
        assert_eq!(storage.orders_with_status(OrderStatus::Pending).unwrap().len(), 1);
    }

    #[test]
    fn test_complete_submission_after_reconcile_keeps_synced() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.put_draft(&create_test_draft("d-1", 5, 100)).unwrap();
        storage.reconcile_orders(&[remote("42", Some(5))], 2_500).unwrap();

        storage
            .complete_submission("d-1", &create_test_order("42", Some(5), OrderStatus::Pending))
            .unwrap();

        assert!(storage.get_draft("d-1").unwrap().is_none());
        let order = storage.get_order("42").unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Synced);
        assert!(storage.orders_with_status(OrderStatus::Pending).unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_updates_status_index() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage
            .complete_submission("d-1", &create_test_order("42", Some(5), OrderStatus::Pending))
            .unwrap();

        let report = storage.reconcile_orders(&[remote("42", None)], 3_000).unwrap();
        assert_eq!(report.merged, 1);

        assert!(storage.orders_with_status(OrderStatus::Pending).unwrap().is_empty());
        let synced = storage.orders_with_status(OrderStatus::Synced).unwrap();
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].display_id, Some(5));
        assert_eq!(synced[0].total, 99.0);
    }

    #[test]
    fn test_reconcile_display_id_conflict_keeps_both() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage
            .complete_submission("d-1", &create_test_order("41", Some(5), OrderStatus::Pending))
            .unwrap();

        // another device used the same number
        let report = storage.reconcile_orders(&[remote("77", Some(5))], 3_000).unwrap();
        assert_eq!(report.merged, 1);
        assert_eq!(report.display_conflicts, 1);

        assert_eq!(storage.get_order_by_display_id(5).unwrap().unwrap().id, "41");
        assert!(storage.get_order("77").unwrap().is_some());
    }

    #[test]
    fn test_reconcile_adopts_anonymous_submission() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut anonymous = create_test_order("d-9", Some(9), OrderStatus::Pending);
        anonymous.draft_id = Some("d-9".to_string());
        storage.complete_submission("d-9", &anonymous).unwrap();

        let report = storage.reconcile_orders(&[remote("500", Some(9))], 3_000).unwrap();
        assert_eq!(report.adopted, 1);

        assert!(storage.get_order("d-9").unwrap().is_none());
        let adopted = storage.get_order("500").unwrap().unwrap();
        assert_eq!(adopted.draft_id.as_deref(), Some("d-9"));
        assert_eq!(adopted.status, OrderStatus::Synced);
        assert_eq!(storage.get_order_by_display_id(9).unwrap().unwrap().id, "500");
        assert_eq!(storage.list_orders().unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.next_display_id().unwrap();
        let mut failed = create_test_draft("f", 1, 100);
        failed.status = DraftStatus::Error;
        storage.put_draft(&failed).unwrap();
        storage.put_draft(&create_test_draft("d", 2, 100)).unwrap();
        storage
            .complete_submission("x", &create_test_order("42", Some(3), OrderStatus::Pending))
            .unwrap();

        let stats = storage.get_stats().unwrap();
        assert_eq!(stats.draft_count, 2);
        assert_eq!(stats.failed_draft_count, 1);
        assert_eq!(stats.order_count, 1);
        assert_eq!(stats.pending_order_count, 1);
        assert_eq!(stats.last_display_id, 1);
    }

    #[test]
    fn test_file_backed_reopen_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.redb");
        {
            let storage = OrderStorage::open(&path).unwrap();
            assert_eq!(storage.next_display_id().unwrap(), 1);
            storage.put_draft(&create_test_draft("d-1", 1, 100)).unwrap();
        }
        let storage = OrderStorage::open(&path).unwrap();
        assert_eq!(storage.next_display_id().unwrap(), 2);
        assert!(storage.get_draft("d-1").unwrap().is_some());
    }
}
