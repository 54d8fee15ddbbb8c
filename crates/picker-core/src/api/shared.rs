//! Process-wide client for hosts that do not wire their own.
//!
//! Only the composition boundary should touch this; feeds and sessions take
//! their source explicitly.

use super::client::PexelsClient;
use crate::config::ApiConfig;
use crate::error::Result;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

static SHARED_CLIENT: OnceLock<RwLock<Option<Arc<PexelsClient>>>> = OnceLock::new();

fn slot() -> &'static RwLock<Option<Arc<PexelsClient>>> {
    SHARED_CLIENT.get_or_init(|| RwLock::new(None))
}

/// Return the shared client, building a default direct-mode one on first use.
pub fn shared_client() -> Result<Arc<PexelsClient>> {
    if let Some(client) = slot().read().ok().and_then(|guard| guard.as_ref().cloned()) {
        return Ok(client);
    }

    let mut guard = slot().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(ref client) = *guard {
        return Ok(client.clone());
    }
    let client = Arc::new(PexelsClient::new(&ApiConfig::default())?);
    *guard = Some(client.clone());
    Ok(client)
}

/// Replace the shared client with one bound to `config`.
///
/// Clients handed out earlier keep their old configuration.
pub fn configure_shared_client(config: &ApiConfig) -> Result<Arc<PexelsClient>> {
    let client = Arc::new(PexelsClient::new(config)?);
    let mut guard = slot().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(client.clone());
    debug!(base_url = client.base_url(), "shared Pexels client reconfigured");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_replaces_instance() {
        let first = configure_shared_client(&ApiConfig::with_api_key("a")).unwrap();
        let second =
            configure_shared_client(&ApiConfig::with_proxy("http://localhost:9000/api")).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        let current = shared_client().unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert_eq!(first.base_url(), "https://api.pexels.com");
    }
}
