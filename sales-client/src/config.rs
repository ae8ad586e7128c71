//! Client configuration

/// Default request timeout in seconds: long enough for slow mobile
/// networks, short enough not to hang the UI.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default capacity of the submission diagnostics log
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Configuration for talking to the remote order backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "https://api.example.com")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Number of attempts kept in the diagnostics log
    pub log_capacity: usize,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the diagnostics log capacity
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Create a network client from this configuration
    pub fn build_client(&self) -> crate::ClientResult<crate::NetworkOrderClient> {
        crate::NetworkOrderClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
