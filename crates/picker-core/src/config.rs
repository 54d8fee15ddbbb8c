//! Centralized configuration for the media picker.
//!
//! Constants for the provider endpoints, feed caching, and UI timing, plus
//! the runtime [`ApiConfig`] that selects direct or proxy mode.

use std::time::Duration;

/// Provider-level configuration.
pub struct PexelsConfig;

impl PexelsConfig {
    pub const API_BASE: &'static str = "https://api.pexels.com";
    pub const USER_AGENT: &'static str = "media-picker/0.3";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    /// Environment variable read by the proxy, never by the core.
    pub const API_KEY_ENV_VAR: &'static str = "PEXELS_API_KEY";
}

/// Pagination and caching behaviour of the feed.
pub struct FeedConfig;

impl FeedConfig {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const FIRST_PAGE: u32 = 1;
    pub const STALE_TIME: Duration = Duration::from_secs(5 * 60);
    /// Retries on top of the first attempt.
    pub const RETRY_COUNT: u32 = 2;
    pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);
    /// Untouched sequences older than this are pruned.
    pub const RETENTION: Duration = Duration::from_secs(30 * 60);
}

/// UI timing and selection defaults.
pub struct UiConfig;

impl UiConfig {
    pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);
    /// How long a toast stays visible before it auto-dismisses.
    pub const TOAST_DURATION: Duration = Duration::from_millis(3000);
    pub const DEFAULT_MAX_SELECTION: usize = 10;
    pub const DEFAULT_MIN_SELECTION: usize = 0;
}

/// Runtime API configuration.
///
/// `api_key` is attached as the `Authorization` header when present.
/// `proxy_url` replaces the provider base URL; a relative proxy path such as
/// `/api/pexels` is resolved against `origin`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub proxy_url: Option<String>,
    pub origin: Option<String>,
    pub per_page: Option<u32>,
}

impl ApiConfig {
    /// Direct mode with a client-side key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Proxy mode; the relay injects the credential server-side.
    pub fn with_proxy(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: Some(proxy_url.into()),
            ..Self::default()
        }
    }

    /// Set the origin used to resolve a relative proxy path.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Override the page size.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn is_proxy_mode(&self) -> bool {
        self.proxy_url.is_some()
    }

    pub fn effective_per_page(&self) -> u32 {
        self.per_page
            .filter(|p| *p > 0)
            .unwrap_or(FeedConfig::DEFAULT_PER_PAGE)
    }
}
