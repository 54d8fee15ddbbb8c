//! HTTP client for the Pexels media API.
//!
//! Works in two modes:
//! - **Direct**: requests go to `https://api.pexels.com` with the API key in
//!   the `Authorization` header.
//! - **Proxy**: requests go to `<proxy-base><same-path>`; the relay injects
//!   the credential, so no header is sent unless a key is configured anyway.

use super::source::MediaSource;
use super::types::{
    PaginationParams, Photo, PhotoSearchParams, PhotosResponse, Video, VideoPopularParams,
    VideoSearchParams, VideosResponse,
};
use crate::config::{ApiConfig, PexelsConfig};
use crate::error::{PickerError, Result, GENERIC_REQUEST_FAILURE};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Shape of an error body from the provider or the proxy.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for Pexels photo and video endpoints.
#[derive(Clone)]
pub struct PexelsClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for PexelsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PexelsClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl PexelsClient {
    /// Create a client for the given configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(PexelsConfig::REQUEST_TIMEOUT)
            .user_agent(PexelsConfig::USER_AGENT)
            .build()
            .map_err(|e| PickerError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Self::with_http_client(config, http)
    }

    /// Create a client around an existing reqwest client.
    pub fn with_http_client(config: &ApiConfig, http: Client) -> Result<Self> {
        if config.api_key.is_some() && config.proxy_url.is_some() {
            warn!("Both an API key and a proxy URL are configured; the key will be sent to the proxy");
        }

        let base_url = resolve_base_url(config)?;
        debug!(%base_url, proxy = config.is_proxy_mode(), "Pexels client configured");

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the full request URL for an endpoint and query pairs.
    pub fn build_url(&self, endpoint: &str, query: &[(&'static str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        if !query.is_empty() {
            let encoded: Vec<String> = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&encoded.join("&"));
        }
        url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let url = self.build_url(endpoint, query);
        debug!(%url, "GET");

        let mut request = self.http.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.header(AUTHORIZATION, key.as_str());
        }

        let response = request.send().await.map_err(|e| PickerError::Network {
            message: format!("GET {} failed: {}", endpoint, e),
            cause: Some(e.to_string()),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.bytes().await {
                Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.error)
                    .unwrap_or_else(|| GENERIC_REQUEST_FAILURE.to_string()),
                Err(_) => GENERIC_REQUEST_FAILURE.to_string(),
            };
            warn!(status = status.as_u16(), %endpoint, %message, "Pexels request failed");
            return Err(PickerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| PickerError::Json {
            message: format!("Failed to parse Pexels response from {}: {}", endpoint, e),
            source: None,
        })
    }

    pub async fn search_photos(&self, params: &PhotoSearchParams) -> Result<PhotosResponse> {
        self.request("/v1/search", &params.to_query()).await
    }

    pub async fn curated_photos(&self, params: &PaginationParams) -> Result<PhotosResponse> {
        self.request("/v1/curated", &params.to_query()).await
    }

    pub async fn photo(&self, id: u64) -> Result<Photo> {
        self.request(&format!("/v1/photos/{}", id), &[]).await
    }

    pub async fn search_videos(&self, params: &VideoSearchParams) -> Result<VideosResponse> {
        self.request("/videos/search", &params.to_query()).await
    }

    pub async fn popular_videos(&self, params: &VideoPopularParams) -> Result<VideosResponse> {
        self.request("/videos/popular", &params.to_query()).await
    }

    pub async fn video(&self, id: u64) -> Result<Video> {
        self.request(&format!("/videos/videos/{}", id), &[]).await
    }
}

/// Pick the base URL for a configuration, without a trailing slash.
fn resolve_base_url(config: &ApiConfig) -> Result<String> {
    let Some(proxy) = config.proxy_url.as_deref() else {
        return Ok(PexelsConfig::API_BASE.to_string());
    };

    if proxy.starts_with("http://") || proxy.starts_with("https://") {
        return Ok(proxy.trim_end_matches('/').to_string());
    }

    let origin = config.origin.as_deref().ok_or_else(|| PickerError::Config {
        message: format!(
            "Relative proxy URL '{}' needs an origin to resolve against",
            proxy
        ),
    })?;
    let resolved = url::Url::parse(origin)
        .and_then(|base| base.join(proxy))
        .map_err(|e| PickerError::Config {
            message: format!("Invalid proxy URL '{}' for origin '{}': {}", proxy, origin, e),
        })?;

    Ok(resolved.as_str().trim_end_matches('/').to_string())
}

#[async_trait]
impl MediaSource for PexelsClient {
    async fn search_photos(&self, params: &PhotoSearchParams) -> Result<PhotosResponse> {
        PexelsClient::search_photos(self, params).await
    }

    async fn curated_photos(&self, params: &PaginationParams) -> Result<PhotosResponse> {
        PexelsClient::curated_photos(self, params).await
    }

    async fn photo(&self, id: u64) -> Result<Photo> {
        PexelsClient::photo(self, id).await
    }

    async fn search_videos(&self, params: &VideoSearchParams) -> Result<VideosResponse> {
        PexelsClient::search_videos(self, params).await
    }

    async fn popular_videos(&self, params: &VideoPopularParams) -> Result<VideosResponse> {
        PexelsClient::popular_videos(self, params).await
    }

    async fn video(&self, id: u64) -> Result<Video> {
        PexelsClient::video(self, id).await
    }
}
