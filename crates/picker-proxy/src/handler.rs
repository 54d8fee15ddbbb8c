//! Request handlers.

use crate::server::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use media_picker_core::PexelsConfig;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Forward a GET to the upstream API with the server-held key.
pub async fn handle_proxy(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let Some(path) = uri
        .path()
        .strip_prefix(state.config.base_path.as_str())
        .filter(|rest| rest.starts_with('/'))
    else {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    };

    let Some(api_key) = state.config.api_key.as_deref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} environment variable is not set", PexelsConfig::API_KEY_ENV_VAR),
        );
    };

    let target = match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    };

    if let Some(cached) = state.cache.get(&target) {
        debug!(%target, "serving cached response");
        return Json(cached.as_ref().clone()).into_response();
    }

    let url = format!("{}{}", state.config.upstream, target);
    debug!(%url, "relaying request");

    let response = match state.http.get(&url).header(AUTHORIZATION, api_key).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Pexels API proxy error: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch from Pexels API");
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %target, "upstream returned an error");
        let status =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return error_response(status, format!("Pexels API error: {}", body));
    }

    match response.json::<Value>().await {
        Ok(body) => {
            let body = Arc::new(body);
            state.cache.insert(target, body.clone());
            Json(body.as_ref().clone()).into_response()
        }
        Err(e) => {
            error!("Pexels API proxy error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch from Pexels API")
        }
    }
}
