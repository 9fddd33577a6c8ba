//! HTTP client configuration

use std::time::Duration;

/// Settings for the pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 4,
            user_agent: format!("gvz/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fractional seconds; non-positive or non-finite values keep the current timeout
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            self.timeout = Duration::from_secs_f64(secs);
        }
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
