//! Offline-first order lifecycle
//!
//! - **storage**: redb persistence for drafts, local orders and the display-id sequence
//! - **validation**: draft input checks and cart normalization
//! - **manager**: DraftsManager, the draft state machine
//! - **reconcile**: merge rules between local and remote orders
//! - **worker**: periodic reconcile loop
//!
//! # Data Flow
//!
//! ```text
//! DraftInput → validate → Draft (redb) → submit → OrderGateway
//!                                          ↓ ok
//!                              LocalOrder PENDING (redb)
//!                                          ↓ reconcile
//!                              LocalOrder SYNCED
//! ```

pub mod error;
pub mod manager;
pub mod money;
pub mod reconcile;
pub mod storage;
pub mod validation;
pub mod worker;

// Re-exports
pub use error::{DraftError, DraftResult, ValidationError};
pub use manager::{DraftsManager, SellerIdentity, INTERRUPTED_MESSAGE, UNRECORDED_MESSAGE};
pub use reconcile::ReconcileReport;
pub use storage::{OrderStorage, StorageError, StorageResult, StorageStats};
pub use worker::ReconcileWorker;
