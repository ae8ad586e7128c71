use crate::orders::SellerIdentity;
use sales_client::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Database file name inside the work directory
pub const DB_FILE_NAME: &str = "orders.redb";

/// Device configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Directory holding the order database |
/// | API_BASE_URL | http://localhost:8080 | Remote order backend |
/// | API_TOKEN | - | Bearer token |
/// | SELLER_ID | - | Seller the device submits for |
/// | SELLER_NAME | - | Seller display name |
/// | REQUEST_TIMEOUT_SECS | 10 | Per-request timeout |
/// | RECONCILE_INTERVAL_SECS | 0 | Periodic reconcile interval, 0 = off |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | - | Directory for daily rolling log files |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/sales API_BASE_URL=https://api.example.com cargo run
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Work directory, holds the redb file
    pub work_dir: String,
    /// Remote order backend base URL
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub seller_id: String,
    pub seller_name: String,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Periodic reconcile interval (seconds), 0 disables the worker
    pub reconcile_interval_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            api_token: std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            seller_id: std::env::var("SELLER_ID").unwrap_or_default(),
            seller_name: std::env::var("SELLER_NAME").unwrap_or_default(),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(sales_client::config::DEFAULT_TIMEOUT_SECS),
            reconcile_interval_secs: std::env::var("RECONCILE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// Override the work directory and backend URL
    ///
    /// Used in tests
    pub fn with_overrides(work_dir: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.api_base_url = api_base_url.into();
        config
    }

    /// Path of the order database
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(DB_FILE_NAME)
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.api_base_url).with_timeout(self.request_timeout_secs);
        match &self.api_token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }

    pub fn seller(&self) -> SellerIdentity {
        SellerIdentity {
            id: self.seller_id.clone(),
            name: self.seller_name.clone(),
        }
    }

    /// Reconcile worker interval, `None` when disabled
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path() {
        let config = SyncConfig::with_overrides("/tmp/sales", "http://api.local");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/sales/orders.redb"));
    }

    #[test]
    fn test_client_config() {
        let mut config = SyncConfig::with_overrides("/tmp/sales", "http://api.local");
        config.api_token = Some("secret".to_string());
        config.request_timeout_secs = 4;

        let client = config.client_config();
        assert_eq!(client.base_url, "http://api.local");
        assert_eq!(client.token.as_deref(), Some("secret"));
        assert_eq!(client.timeout, 4);
    }

    #[test]
    fn test_reconcile_interval() {
        let mut config = SyncConfig::with_overrides("/tmp/sales", "http://api.local");
        config.reconcile_interval_secs = 0;
        assert!(config.reconcile_interval().is_none());
        config.reconcile_interval_secs = 30;
        assert_eq!(config.reconcile_interval(), Some(Duration::from_secs(30)));
    }
}
