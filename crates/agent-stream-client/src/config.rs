use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the workflow backend endpoints.
///
/// No total request timeout is configured: a subscription is open-ended and
/// stays alive until the backend sends `completion` or the caller stops it.
/// Only the connect phase is bounded.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Base URL of the workflow backend.
    pub base_url: String,
    /// Timeout applied to connection establishment only.
    pub connect_timeout: Duration,
}

impl BackendConfig {
    /// Creates a config with defaults and the provided base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Builds a config from `AGENT_BACKEND_URL`, defaulting to
    /// `http://localhost:8000`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("AGENT_BACKEND_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Overrides the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub(crate) fn query_url(&self) -> String {
        format!("{}/api/query", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn test_url(&self) -> String {
        format!("{}/api/test-sse", self.base_url.trim_end_matches('/'))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
