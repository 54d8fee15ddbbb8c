//! Normalized media items and filter state.
//!
//! Provider photos and videos are normalized into a single [`MediaItem`]
//! shape before they reach the selection store or the host application.

use crate::api::{Photo, Video, VideoFile, VideoQuality};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Active tab of the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Photos,
    Videos,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photos => "photos",
            MediaType::Videos => "videos",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Large,
    Medium,
    Small,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Large => "large",
            Size::Medium => "medium",
            Size::Small => "small",
        }
    }
}

/// Search filters. Photo filters: orientation, size, color. Video filters:
/// duration bounds in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub orientation: Option<Orientation>,
    pub size: Option<Size>,
    pub color: Option<String>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
}

/// A single-field filter change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Orientation(Option<Orientation>),
    Size(Option<Size>),
    Color(Option<String>),
    MinDuration(Option<u32>),
    MaxDuration(Option<u32>),
}

impl FilterState {
    /// Apply one field change, leaving the others untouched.
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::Orientation(v) => self.orientation = v,
            FilterUpdate::Size(v) => self.size = v,
            FilterUpdate::Color(v) => self.color = v,
            FilterUpdate::MinDuration(v) => self.min_duration = v,
            FilterUpdate::MaxDuration(v) => self.max_duration = v,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Source variants of a media item, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSources {
    pub original: String,
    pub large: String,
    pub medium: String,
    pub small: String,
}

/// Normalized photo or video surfaced to the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub author: String,
    pub author_url: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_color: Option<String>,
    pub src: MediaSources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_files: Option<Vec<VideoFile>>,
}

impl MediaItem {
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

impl From<&Photo> for MediaItem {
    fn from(photo: &Photo) -> Self {
        MediaItem {
            id: photo.id,
            kind: MediaKind::Photo,
            width: photo.width,
            height: photo.height,
            url: photo.url.clone(),
            author: photo.photographer.clone(),
            author_url: photo.photographer_url.clone(),
            thumbnail: photo.src.medium.clone(),
            avg_color: photo.avg_color.clone(),
            src: MediaSources {
                original: photo.src.original.clone(),
                large: photo.src.large.clone(),
                medium: photo.src.medium.clone(),
                small: photo.src.small.clone(),
            },
            duration: None,
            video_files: None,
        }
    }
}

impl From<&Video> for MediaItem {
    /// The hd rendition backs the large slots and the sd rendition the
    /// small ones; a missing quality falls back to the first file.
    fn from(video: &Video) -> Self {
        let link_of = |quality: VideoQuality| {
            video
                .video_files
                .iter()
                .find(|f| f.quality == Some(quality))
                .or_else(|| video.video_files.first())
                .map(|f| f.link.clone())
                .unwrap_or_default()
        };
        let hd = link_of(VideoQuality::Hd);
        let sd = link_of(VideoQuality::Sd);

        MediaItem {
            id: video.id,
            kind: MediaKind::Video,
            width: video.width,
            height: video.height,
            url: video.url.clone(),
            author: video.user.name.clone(),
            author_url: video.user.url.clone(),
            thumbnail: video.image.clone(),
            avg_color: None,
            src: MediaSources {
                original: hd.clone(),
                large: hd,
                medium: sd.clone(),
                small: sd,
            },
            duration: Some(video.duration),
            video_files: Some(video.video_files.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::api::{Photo, PhotoSrc, Video, VideoFile, VideoQuality, VideoUser};

    pub fn photo(id: u64) -> Photo {
        Photo {
            id,
            width: 1920,
            height: 1080,
            url: format!("https://www.pexels.com/photo/{id}/"),
            photographer: "Jane Doe".into(),
            photographer_url: "https://www.pexels.com/@jane".into(),
            photographer_id: 7,
            avg_color: Some("#7A8B6C".into()),
            src: PhotoSrc {
                original: format!("https://images.pexels.com/{id}/original.jpg"),
                large2x: format!("https://images.pexels.com/{id}/large2x.jpg"),
                large: format!("https://images.pexels.com/{id}/large.jpg"),
                medium: format!("https://images.pexels.com/{id}/medium.jpg"),
                small: format!("https://images.pexels.com/{id}/small.jpg"),
                portrait: format!("https://images.pexels.com/{id}/portrait.jpg"),
                landscape: format!("https://images.pexels.com/{id}/landscape.jpg"),
                tiny: format!("https://images.pexels.com/{id}/tiny.jpg"),
            },
            liked: false,
            alt: "A field".into(),
        }
    }

    pub fn video_file(id: u64, quality: VideoQuality) -> VideoFile {
        VideoFile {
            id,
            quality: Some(quality),
            file_type: "video/mp4".into(),
            width: Some(1280),
            height: Some(720),
            fps: Some(25.0),
            link: format!("https://videos.pexels.com/{id}.mp4"),
        }
    }

    pub fn video(id: u64, files: Vec<VideoFile>) -> Video {
        Video {
            id,
            width: 1920,
            height: 1080,
            url: format!("https://www.pexels.com/video/{id}/"),
            image: format!("https://images.pexels.com/videos/{id}/preview.jpg"),
            duration: 42,
            user: VideoUser {
                id: 3,
                name: "John Roe".into(),
                url: "https://www.pexels.com/@john".into(),
            },
            video_files: files,
            video_pictures: vec![],
        }
    }
}
