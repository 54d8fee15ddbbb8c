//! In-process fake of the Pexels API for integration tests.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// A request as seen by the fake provider.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: String,
    pub params: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeProvider {
    requests: Arc<Mutex<Vec<Recorded>>>,
    /// Respond with 503 this many times before answering normally.
    flaky: Arc<Mutex<u32>>,
    /// Respond with 429 this many times before answering normally.
    throttled: Arc<Mutex<u32>>,
}

impl FakeProvider {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fail_next(&self, times: u32) {
        *self.flaky.lock().unwrap() = times;
    }

    pub fn rate_limit_next(&self, times: u32) {
        *self.throttled.lock().unwrap() = times;
    }
}

/// Start the fake provider on an ephemeral port.
pub async fn start_fake_provider() -> (SocketAddr, FakeProvider) {
    let provider = FakeProvider::default();
    let app = Router::new().fallback(handle).with_state(provider.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, provider)
}

async fn handle(State(provider): State<FakeProvider>, uri: Uri, headers: HeaderMap) -> Response {
    let query = uri.query().unwrap_or_default().to_string();
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let path = uri.path().to_string();

    provider.requests.lock().unwrap().push(Recorded {
        path: path.clone(),
        query: query.clone(),
        params: params.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    {
        let mut flaky = provider.flaky.lock().unwrap();
        if *flaky > 0 {
            *flaky -= 1;
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Service unavailable"})),
            )
                .into_response();
        }
    }

    {
        let mut throttled = provider.throttled.lock().unwrap();
        if *throttled > 0 {
            *throttled -= 1;
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "Rate limit exceeded"})),
            )
                .into_response();
        }
    }

    match params.get("query").map(String::as_str) {
        Some("ratelimit") => {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "Rate limit exceeded"})),
            )
                .into_response()
        }
        Some("broken") => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        _ => {}
    }

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

    match path.as_str() {
        "/v1/search" | "/v1/curated" => Json(photos_page(&path, page)).into_response(),
        "/videos/search" | "/videos/popular" => Json(videos_page(&path, page)).into_response(),
        "/v1/photos/42" => Json(photo(42)).into_response(),
        "/videos/videos/7" => Json(video(7)).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response(),
    }
}

/// Two pages, two items each.
fn photos_page(path: &str, page: u32) -> Value {
    json!({
        "page": page,
        "per_page": 2,
        "total_results": 4,
        "photos": [photo(page as u64 * 100), photo(page as u64 * 100 + 1)],
        "next_page": next_page(path, page),
    })
}

fn videos_page(path: &str, page: u32) -> Value {
    json!({
        "page": page,
        "per_page": 2,
        "total_results": 4,
        "url": "https://www.pexels.com/videos/",
        "videos": [video(page as u64 * 100), video(page as u64 * 100 + 1)],
        "next_page": next_page(path, page),
    })
}

fn next_page(path: &str, page: u32) -> Value {
    if page < 2 {
        json!(format!("https://api.pexels.com{}/?page={}&per_page=2", path, page + 1))
    } else {
        Value::Null
    }
}

pub fn photo(id: u64) -> Value {
    json!({
        "id": id,
        "width": 4000,
        "height": 3000,
        "url": format!("https://www.pexels.com/photo/{id}/"),
        "photographer": "Ana Lima",
        "photographer_url": "https://www.pexels.com/@ana",
        "photographer_id": 12,
        "avg_color": "#5A6B4C",
        "src": {
            "original": format!("https://images.pexels.com/photos/{id}/original.jpeg"),
            "large2x": format!("https://images.pexels.com/photos/{id}/large2x.jpeg"),
            "large": format!("https://images.pexels.com/photos/{id}/large.jpeg"),
            "medium": format!("https://images.pexels.com/photos/{id}/medium.jpeg"),
            "small": format!("https://images.pexels.com/photos/{id}/small.jpeg"),
            "portrait": format!("https://images.pexels.com/photos/{id}/portrait.jpeg"),
            "landscape": format!("https://images.pexels.com/photos/{id}/landscape.jpeg"),
            "tiny": format!("https://images.pexels.com/photos/{id}/tiny.jpeg")
        },
        "liked": false,
        "alt": "Green hills"
    })
}

pub fn video(id: u64) -> Value {
    json!({
        "id": id,
        "width": 1920,
        "height": 1080,
        "url": format!("https://www.pexels.com/video/{id}/"),
        "image": format!("https://images.pexels.com/videos/{id}/poster.jpeg"),
        "duration": 75,
        "user": {"id": 5, "name": "Kai Chen", "url": "https://www.pexels.com/@kai"},
        "video_files": [
            {"id": 1, "quality": "sd", "file_type": "video/mp4", "width": 640, "height": 360, "fps": 25.0,
             "link": format!("https://videos.pexels.com/{id}/sd.mp4")},
            {"id": 2, "quality": "hd", "file_type": "video/mp4", "width": 1920, "height": 1080, "fps": 25.0,
             "link": format!("https://videos.pexels.com/{id}/hd.mp4")},
            {"id": 3, "quality": null, "file_type": "video/mp4", "width": null, "height": null, "fps": null,
             "link": format!("https://videos.pexels.com/{id}/hls.m3u8")}
        ],
        "video_pictures": [
            {"id": 1, "picture": format!("https://images.pexels.com/videos/{id}/pic.jpeg"), "nr": 0}
        ]
    })
}
