//! Client configuration.
//!
//! Resolved once at startup and handed to the client; nothing reads the
//! environment after that.

use std::time::Duration;

/// Environment variable holding the API base address.
pub const API_BASE_ENV: &str = "ESTIMATOR_API_BASE";

/// Fallback variable used by the web front end's deployments.
pub const LEGACY_API_BASE_ENV: &str = "VITE_API_BASE";

/// Environment variable holding the per-request timeout in seconds.
pub const TIMEOUT_ENV: &str = "ESTIMATOR_TIMEOUT_SECS";

/// Default API base address (local development backend).
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of most recent orders shown on the dashboard.
pub const DEFAULT_ORDERS_WINDOW: usize = 50;

/// Configuration for the estimator client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Endpoint root, without trailing slash.
    pub base_url: String,

    /// Upper bound for a single request.
    pub request_timeout: Duration,

    /// How many orders the dashboard keeps after reversing.
    pub orders_window: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            orders_window: DEFAULT_ORDERS_WINDOW,
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset. An unparsable timeout falls back to
    /// the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();

        if let Some(base) = non_blank(API_BASE_ENV).or_else(|| non_blank(LEGACY_API_BASE_ENV)) {
            config = config.with_base_url(base);
        }

        if let Some(secs) = non_blank(TIMEOUT_ENV).and_then(|v| v.trim().parse::<u64>().ok()) {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config
    }

    /// Set the base address. Surrounding whitespace and trailing slashes are removed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the dashboard orders window.
    pub fn with_orders_window(mut self, window: usize) -> Self {
        self.orders_window = window;
        self
    }

    /// Join an endpoint path onto the base address.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
