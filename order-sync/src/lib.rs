//! Order Sync - offline-first order lifecycle for field-sales devices
//!
//! # Overview
//!
//! A seller builds orders while offline. Each order lives as a durable
//! draft with a device-local display number until it is submitted to the
//! remote backend; accepted orders are kept as PENDING until the remote
//! order list confirms them.
//!
//! # Module Structure
//!
//! ```text
//! order-sync/src/
//! ├── core/          # configuration
//! ├── orders/        # drafts, storage, submission, reconcile
//! └── utils/         # logging
//! ```

pub mod core;
pub mod orders;
pub mod utils;

// Re-export public types
pub use core::SyncConfig;
pub use orders::{
    DraftError, DraftResult, DraftsManager, OrderStorage, ReconcileReport, ReconcileWorker,
    SellerIdentity, ValidationError,
};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and initialize logging
pub fn setup_environment() -> SyncConfig {
    dotenv::dotenv().ok();
    let config = SyncConfig::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}
