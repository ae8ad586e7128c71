//! Order domain types
//!
//! - Drafts: durable in-progress orders owned by the device
//! - Local orders: records kept after a draft was accepted by the server
//! - Wire: the submission projection and the remote listing shape

pub mod draft;
pub mod local;
pub mod types;
pub mod wire;

// Re-exports
pub use draft::{CartLine, Draft, DraftEvent, DraftInput, DraftStatus, PaymentSelection};
pub use local::{LocalOrder, OrderStatus};
pub use types::*;
pub use wire::{OrderSubmission, RemoteOrder, RemoteOrderItem};
