//! HTTP server implementation using Axum.

use crate::handler::{handle_health, handle_proxy};
use axum::{routing::get, Router};
use media_picker_core::{FeedConfig, PexelsConfig};
use mini_moka::sync::Cache;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Relay settings.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Server-held credential. Requests fail with 500 while it is unset.
    pub api_key: Option<String>,
    pub upstream: String,
    /// Prefix stripped from incoming paths before forwarding.
    pub base_path: String,
    /// How long successful upstream responses are reused.
    pub cache_ttl: Duration,
}

impl ProxyConfig {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            api_key: None,
            upstream: upstream.into().trim_end_matches('/').to_string(),
            base_path: String::new(),
            cache_ttl: FeedConfig::STALE_TIME,
        }
    }

    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    #[cfg(test)]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ProxyConfig,
    /// Client for upstream calls
    pub http: reqwest::Client,
    /// Successful responses keyed by path and query
    pub cache: Cache<String, Arc<Value>>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(PexelsConfig::REQUEST_TIMEOUT)
            .user_agent(PexelsConfig::USER_AGENT)
            .build()?;
        let cache = Cache::builder()
            .time_to_live(config.cache_ttl)
            .max_capacity(512)
            .build();

        Ok(Self {
            config,
            http,
            cache,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // The picker may be served from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .fallback(handle_proxy)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the proxy server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(config: ProxyConfig, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    info!(upstream = %config.upstream, base_path = %config.base_path, "configuring proxy");
    let app = build_router(Arc::new(AppState::new(config)?));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode, Uri},
        response::IntoResponse,
        Json,
    };
    use serde_json::json;
    use std::sync::Mutex;

    type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

    /// Upstream stand-in: echoes what it received, fails on demand.
    async fn start_upstream() -> (SocketAddr, Seen) {
        let seen: Seen = Arc::default();
        let log = seen.clone();
        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
            let log = log.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                log.lock().unwrap().push((uri.to_string(), auth));

                match uri.path() {
                    "/v1/photos/404" => (StatusCode::NOT_FOUND, "Not Found").into_response(),
                    "/v1/curated" if uri.query() == Some("page=9") => {
                        (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
                    }
                    _ => Json(json!({"path": uri.path(), "query": uri.query(), "photos": []}))
                        .into_response(),
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, seen)
    }

    async fn get(addr: SocketAddr, path_and_query: &str) -> (u16, Value) {
        let response = reqwest::get(format!("http://{}{}", addr, path_and_query))
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_server_starts() {
        let addr = start_server(ProxyConfig::new("http://127.0.0.1:1"), "127.0.0.1", 0)
            .await
            .unwrap();
        assert!(addr.port() > 0);

        let (status, body) = get(addr, "/health").await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_forwards_path_query_and_key() {
        let (upstream, seen) = start_upstream().await;
        let config = ProxyConfig::new(format!("http://{}", upstream)).api_key(Some("secret".into()));
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        let (status, body) = get(addr, "/v1/search?query=cats&page=2").await;
        assert_eq!(status, 200);
        assert_eq!(body["path"], "/v1/search");
        assert_eq!(body["query"], "query=cats&page=2");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "/v1/search?query=cats&page=2");
        assert_eq!(seen[0].1.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_missing_key_is_500() {
        let (upstream, seen) = start_upstream().await;
        let addr = start_server(ProxyConfig::new(format!("http://{}", upstream)), "127.0.0.1", 0)
            .await
            .unwrap();

        let (status, body) = get(addr, "/v1/curated").await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "PEXELS_API_KEY environment variable is not set");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_status_passes_through() {
        let (upstream, _) = start_upstream().await;
        let config = ProxyConfig::new(format!("http://{}", upstream)).api_key(Some("k".into()));
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        let (status, body) = get(addr, "/v1/photos/404").await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "Pexels API error: Not Found");

        let (status, body) = get(addr, "/v1/curated?page=9").await;
        assert_eq!(status, 429);
        assert_eq!(body["error"], "Pexels API error: slow down");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500() {
        let config = ProxyConfig::new("http://127.0.0.1:1").api_key(Some("k".into()));
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        let (status, body) = get(addr, "/v1/curated").await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to fetch from Pexels API");
    }

    #[tokio::test]
    async fn test_successful_responses_are_cached() {
        let (upstream, seen) = start_upstream().await;
        let config = ProxyConfig::new(format!("http://{}", upstream)).api_key(Some("k".into()));
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        get(addr, "/v1/curated?page=1").await;
        get(addr, "/v1/curated?page=1").await;
        get(addr, "/v1/curated?page=2").await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let (upstream, seen) = start_upstream().await;
        let config = ProxyConfig::new(format!("http://{}", upstream))
            .api_key(Some("k".into()))
            .cache_ttl(Duration::from_millis(20));
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        get(addr, "/v1/curated").await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        get(addr, "/v1/curated").await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_base_path_is_stripped() {
        let (upstream, seen) = start_upstream().await;
        let config = ProxyConfig::new(format!("http://{}", upstream))
            .api_key(Some("k".into()))
            .base_path("/api/pexels/");
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        let (status, _) = get(addr, "/api/pexels/videos/popular?per_page=2").await;
        assert_eq!(status, 200);
        assert_eq!(seen.lock().unwrap()[0].0, "/videos/popular?per_page=2");

        let (status, _) = get(addr, "/elsewhere").await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_outside_base_path_is_404_without_key() {
        let (upstream, seen) = start_upstream().await;
        let config = ProxyConfig::new(format!("http://{}", upstream)).base_path("/api/pexels");
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        let (status, body) = get(addr, "/elsewhere").await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "Not found");

        let (status, _) = get(addr, "/api/pexels/v1/curated").await;
        assert_eq!(status, 500);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_get_is_relayed() {
        let config = ProxyConfig::new("http://127.0.0.1:1").api_key(Some("k".into()));
        let addr = start_server(config, "127.0.0.1", 0).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("http://{}/v1/curated", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 405);
    }
}
