//! Media Picker Core - Headless state and data layer for a Pexels media picker.
//!
//! This crate owns everything a picker UI needs except the rendering: the
//! Pexels API client, paginated feeds with infinite-scroll guarding, the
//! per-session selection store, the debounced search box and the host
//! callback surface. The companion `media-picker-proxy` crate serves the
//! credential-injecting relay used in proxy mode.
//!
//! # Example
//!
//! ```rust,ignore
//! use media_picker_core::{
//!     ApiConfig, MediaFeed, PexelsClient, PickerCallbacks, PickerOptions, PickerSession,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> media_picker_core::Result<()> {
//!     let client = PexelsClient::new(&ApiConfig::with_proxy("http://localhost:8787"))?;
//!     let feed = MediaFeed::new(Arc::new(client));
//!
//!     let callbacks = PickerCallbacks::new().on_select(|picked| println!("{:?}", picked));
//!     let mut session = PickerSession::new(PickerOptions::default().multiple(5), callbacks);
//!     session.open();
//!
//!     let page = feed.load_first_page(&session.feed_key()).await;
//!     if let Some(first) = page.items.first() {
//!         session.toggle(first.clone());
//!     }
//!     session.confirm();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod media;
pub mod network;
pub mod pagination;
pub mod search_input;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use api::{configure_shared_client, shared_client, DynMediaSource, MediaSource, PexelsClient};
pub use config::{ApiConfig, FeedConfig, PexelsConfig, UiConfig};
pub use error::{PickerError, Result};
pub use format::{format_dimensions, format_duration, format_file_size, format_template};
pub use media::{FilterState, FilterUpdate, MediaItem, MediaKind, MediaSources, MediaType, Orientation, Size};
pub use pagination::{next_page_from, should_load_more, FeedKey, FeedSnapshot, MediaFeed, ResultPage};
pub use search_input::{SearchInput, SearchInputState};
pub use session::{
    Confirmed, PickerCallbacks, PickerOptions, PickerSession, PickerTexts, SelectionChangeEvent,
    ToastOptions,
};
pub use store::{PickerState, PickerStore, ToastSeverity, ToastState, ToggleOutcome};
