//! Sales Client - remote order API for field-sales devices
//!
//! Submits finalized drafts, lists the seller's orders and fetches
//! customer payment plans. The sync core depends only on the
//! [`OrderGateway`] trait; [`NetworkOrderClient`] is the HTTP implementation.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod http;
pub mod request;

pub use config::ClientConfig;
pub use diagnostics::{AttemptEntry, AttemptOutcome, SubmissionLog};
pub use error::{ClientError, ClientResult, SubmitError};
pub use gateway::{OrderGateway, SubmitReceipt};
pub use http::NetworkOrderClient;
