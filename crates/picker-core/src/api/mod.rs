//! Pexels API access.
//!
//! - [`PexelsClient`]: HTTP client for direct or proxy mode
//! - [`MediaSource`]: trait the feed depends on
//! - wire types and query parameter builders

mod client;
mod shared;
mod source;
mod types;

pub use client::PexelsClient;
pub use shared::{configure_shared_client, shared_client};
pub use source::{DynMediaSource, MediaSource};
pub use types::{
    PaginationParams, Photo, PhotoSearchParams, PhotoSrc, PhotosResponse, QueryPairs, Video,
    VideoFile, VideoPicture, VideoPopularParams, VideoQuality, VideoSearchParams, VideoUser,
    VideosResponse,
};
