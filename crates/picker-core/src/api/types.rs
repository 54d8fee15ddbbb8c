//! Provider wire types and request parameters.
//!
//! Response structs mirror the Pexels JSON payloads field for field. Request
//! parameter structs render themselves into query pairs, skipping unset and
//! empty values.

use crate::media::{Orientation, Size};
use serde::{Deserialize, Serialize};

/// Photo record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub photographer: String,
    pub photographer_url: String,
    #[serde(default)]
    pub photographer_id: u64,
    #[serde(default)]
    pub avg_color: Option<String>,
    pub src: PhotoSrc,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSrc {
    pub original: String,
    pub large2x: String,
    pub large: String,
    pub medium: String,
    pub small: String,
    pub portrait: String,
    pub landscape: String,
    pub tiny: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotosResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

/// Video record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub image: String,
    pub duration: u32,
    pub user: VideoUser,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
    #[serde(default)]
    pub video_pictures: Vec<VideoPicture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoUser {
    pub id: u64,
    pub name: String,
    pub url: String,
}

/// Rendition quality of a video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Hd,
    Sd,
    Uhd,
    /// Anything the provider adds later (e.g. adaptive streams).
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub id: u64,
    /// `null` for adaptive streams.
    #[serde(default)]
    pub quality: Option<VideoQuality>,
    pub file_type: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPicture {
    pub id: u64,
    pub picture: String,
    pub nr: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

/// Ordered query pairs for a request.
pub type QueryPairs = Vec<(&'static str, String)>;

fn push_opt(pairs: &mut QueryPairs, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            pairs.push((key, value));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "page", self.page.map(|p| p.to_string()));
        push_opt(&mut pairs, "per_page", self.per_page.map(|p| p.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSearchParams {
    pub query: String,
    pub orientation: Option<Orientation>,
    pub size: Option<Size>,
    pub color: Option<String>,
    pub locale: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PhotoSearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "query", Some(self.query.clone()));
        push_opt(&mut pairs, "orientation", self.orientation.map(|o| o.as_str().to_string()));
        push_opt(&mut pairs, "size", self.size.map(|s| s.as_str().to_string()));
        push_opt(&mut pairs, "color", self.color.clone());
        push_opt(&mut pairs, "locale", self.locale.clone());
        pairs.extend(
            PaginationParams {
                page: self.page,
                per_page: self.per_page,
            }
            .to_query(),
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSearchParams {
    pub query: String,
    pub orientation: Option<Orientation>,
    pub size: Option<Size>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl VideoSearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "query", Some(self.query.clone()));
        push_opt(&mut pairs, "orientation", self.orientation.map(|o| o.as_str().to_string()));
        push_opt(&mut pairs, "size", self.size.map(|s| s.as_str().to_string()));
        pairs.extend(
            PaginationParams {
                page: self.page,
                per_page: self.per_page,
            }
            .to_query(),
        );
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoPopularParams {
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl VideoPopularParams {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "min_width", self.min_width.map(|v| v.to_string()));
        push_opt(&mut pairs, "min_height", self.min_height.map(|v| v.to_string()));
        push_opt(&mut pairs, "min_duration", self.min_duration.map(|v| v.to_string()));
        push_opt(&mut pairs, "max_duration", self.max_duration.map(|v| v.to_string()));
        pairs.extend(
            PaginationParams {
                page: self.page,
                per_page: self.per_page,
            }
            .to_query(),
        );
        pairs
    }
}
