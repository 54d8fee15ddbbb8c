//! MediaSource trait: the seam between the feed and the provider.
//!
//! [`PexelsClient`](super::PexelsClient) is the production implementation.
//! Tests and alternative backends plug in their own implementation and hand
//! it to the feed as a [`DynMediaSource`].

use super::types::{
    PaginationParams, Photo, PhotoSearchParams, PhotosResponse, Video, VideoPopularParams,
    VideoSearchParams, VideosResponse,
};
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to a stock media provider.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Full-text photo search.
    async fn search_photos(&self, params: &PhotoSearchParams) -> Result<PhotosResponse>;

    /// Editorially curated photos, used when no query is set.
    async fn curated_photos(&self, params: &PaginationParams) -> Result<PhotosResponse>;

    async fn photo(&self, id: u64) -> Result<Photo>;

    /// Full-text video search.
    async fn search_videos(&self, params: &VideoSearchParams) -> Result<VideosResponse>;

    /// Popular videos, used when no query is set.
    async fn popular_videos(&self, params: &VideoPopularParams) -> Result<VideosResponse>;

    async fn video(&self, id: u64) -> Result<Video>;
}

pub type DynMediaSource = std::sync::Arc<dyn MediaSource>;
