//! Core module - device configuration
//!
//! - [`SyncConfig`] - configuration loaded from the environment

pub mod config;

pub use config::SyncConfig;
