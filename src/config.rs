//! Client configuration

use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Settings for reaching the grievance API and laying out pages
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, e.g. "http://localhost:5000/api"
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts for idempotent reads after a transient failure
    pub read_retries: u32,
    pub page_size: NonZeroUsize,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
            read_retries: 2,
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Zero would fail every request at once, so it is ignored.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        if seconds > 0 {
            self.timeout_secs = seconds;
        }
        self
    }

    pub fn with_read_retries(mut self, retries: u32) -> Self {
        self.read_retries = retries;
        self
    }

    /// Zero is ignored and the current page size kept.
    pub fn with_page_size(mut self, size: usize) -> Self {
        if let Some(size) = NonZeroUsize::new(size) {
            self.page_size = size;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
