//! Paginated media feeds.
//!
//! A [`MediaFeed`] owns one page sequence per [`FeedKey`] (media type, query
//! and filters). Returning to a recent search reuses its pages. Once a
//! sequence's first page is older than the freshness window it is marked
//! stale: its pages stay readable and scrollable, and the next
//! [`MediaFeed::load_first_page`] refreshes page 1 in place. Sequences that
//! nobody has touched for the retention window are pruned.
//!
//! Page fetches go through [`retry_async`] with the default retry count.
//! Only one fetch per key is in flight at a time, and results for a sequence
//! that was invalidated meanwhile are dropped.

use crate::api::{
    DynMediaSource, PaginationParams, PhotoSearchParams, PhotosResponse, VideoPopularParams,
    VideoSearchParams, VideosResponse,
};
use crate::config::FeedConfig;
use crate::error::{PickerError, Result};
use crate::media::{FilterState, MediaItem, MediaType};
use crate::network::{retry_async, RetryPolicy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Extract the next page number from a provider `next_page` URL.
///
/// Returns `None` (end of results) when the URL is absent or malformed, or
/// when its `page` parameter is missing, non-numeric or zero.
pub fn next_page_from(next_page: Option<&str>) -> Option<u32> {
    let url = url::Url::parse(next_page?).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|page| *page > 0)
}

/// Infinite-scroll guard: load more only when the sentinel is visible, more
/// pages exist and nothing is loading.
pub fn should_load_more(intersecting: bool, has_more: bool, is_loading: bool) -> bool {
    intersecting && has_more && !is_loading
}

/// Identity of a page sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FeedKey {
    pub media_type: MediaType,
    pub query: String,
    pub filters: FilterState,
}

impl FeedKey {
    pub fn new(media_type: MediaType, query: impl Into<String>, filters: FilterState) -> Self {
        Self {
            media_type,
            query: query.into(),
            filters,
        }
    }

    /// Trimmed query, or `None` when the feed should browse instead of search.
    pub fn search_term(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// One fetched page, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub page: u32,
    pub items: Vec<MediaItem>,
    pub total_results: u64,
    pub next_page: Option<u32>,
}

impl ResultPage {
    fn from_photos(page: u32, response: PhotosResponse) -> Self {
        Self {
            page,
            items: response.photos.iter().map(MediaItem::from).collect(),
            total_results: response.total_results,
            next_page: next_page_from(response.next_page.as_deref()),
        }
    }

    fn from_videos(page: u32, response: VideosResponse) -> Self {
        Self {
            page,
            items: response.videos.iter().map(MediaItem::from).collect(),
            total_results: response.total_results,
            next_page: next_page_from(response.next_page.as_deref()),
        }
    }
}

/// Read-only view of a sequence for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// Items of every loaded page, in page order.
    pub items: Vec<MediaItem>,
    pub page_count: usize,
    pub total_results: u64,
    pub has_more: bool,
    /// First page in flight.
    pub is_loading: bool,
    /// A later page in flight.
    pub is_fetching_next: bool,
    /// Page 1 of a stale sequence is being fetched again.
    pub is_refreshing: bool,
    /// The first page is older than the freshness window.
    pub is_stale: bool,
    pub error: Option<String>,
    /// HTTP status of the last failure, when it was a status error.
    pub error_status: Option<u16>,
}

impl FeedSnapshot {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_fetching_next || self.is_refreshing
    }
}

#[derive(Debug)]
struct PageSequence {
    pages: Vec<ResultPage>,
    in_flight: Option<u32>,
    refreshing: bool,
    error: Option<(String, Option<u16>)>,
    failed_page: Option<u32>,
    /// When page 1 last landed.
    fetched_at: Option<Instant>,
    touched_at: Instant,
}

impl PageSequence {
    fn new(now: Instant) -> Self {
        Self {
            pages: Vec::new(),
            in_flight: None,
            refreshing: false,
            error: None,
            failed_page: None,
            fetched_at: None,
            touched_at: now,
        }
    }

    fn is_stale(&self, stale_time: Duration) -> bool {
        self.fetched_at.is_some_and(|at| at.elapsed() >= stale_time)
    }

    /// Page to request next; page 1 for an empty sequence.
    fn next_page_param(&self) -> Option<u32> {
        match self.pages.last() {
            Some(last) => last.next_page,
            None => Some(FeedConfig::FIRST_PAGE),
        }
    }

    fn begin(&mut self, page: u32) {
        self.in_flight = Some(page);
        self.refreshing = page == FeedConfig::FIRST_PAGE && !self.pages.is_empty();
        self.error = None;
        self.failed_page = None;
    }

    fn finish(&mut self, page: u32, result: Result<ResultPage>) {
        let refreshing = std::mem::take(&mut self.refreshing);
        self.in_flight = None;
        match result {
            Ok(result_page) if refreshing => {
                self.pages = vec![result_page];
                self.fetched_at = Some(Instant::now());
            }
            Ok(result_page) => {
                let expected = self.next_page_param();
                if expected == Some(result_page.page) {
                    if result_page.page == FeedConfig::FIRST_PAGE {
                        self.fetched_at = Some(Instant::now());
                    }
                    self.pages.push(result_page);
                } else {
                    warn!(page, ?expected, "out-of-order page ignored");
                }
            }
            Err(err) => {
                self.error = Some((err.to_string(), err.status()));
                self.failed_page = Some(page);
            }
        }
    }

    fn snapshot(&self, stale_time: Duration) -> FeedSnapshot {
        let busy = self.in_flight.is_some();
        FeedSnapshot {
            items: self
                .pages
                .iter()
                .flat_map(|p| p.items.iter().cloned())
                .collect(),
            page_count: self.pages.len(),
            total_results: self.pages.last().map(|p| p.total_results).unwrap_or(0),
            has_more: self
                .pages
                .last()
                .map(|p| p.next_page.is_some())
                .unwrap_or(false),
            is_loading: busy && self.pages.is_empty(),
            is_fetching_next: busy && !self.pages.is_empty() && !self.refreshing,
            is_refreshing: busy && self.refreshing,
            is_stale: self.is_stale(stale_time),
            error: self.error.as_ref().map(|(message, _)| message.clone()),
            error_status: self.error.as_ref().and_then(|(_, status)| *status),
        }
    }
}

type SharedSequence = Arc<Mutex<PageSequence>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Which fetch to start for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    First,
    Next,
    Retry,
}

/// Paginated, cached access to a [`MediaSource`](crate::api::MediaSource).
pub struct MediaFeed {
    source: DynMediaSource,
    per_page: u32,
    retry_policy: RetryPolicy,
    stale_time: Duration,
    retention: Duration,
    sequences: Mutex<HashMap<FeedKey, SharedSequence>>,
}

impl std::fmt::Debug for MediaFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFeed")
            .field("per_page", &self.per_page)
            .field("stale_time", &self.stale_time)
            .field("retention", &self.retention)
            .field("cached_sequences", &lock(&self.sequences).len())
            .finish()
    }
}

impl MediaFeed {
    pub fn new(source: DynMediaSource) -> Self {
        Self {
            source,
            per_page: FeedConfig::DEFAULT_PER_PAGE,
            retry_policy: RetryPolicy::default(),
            stale_time: FeedConfig::STALE_TIME,
            retention: FeedConfig::RETENTION,
            sequences: Mutex::new(HashMap::new()),
        }
    }

    /// Page size; zero keeps the default.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        if per_page > 0 {
            self.per_page = per_page;
        }
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Freshness window after which page 1 is refetched.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// How long an untouched sequence is kept before it is pruned.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Current state of a key without fetching anything.
    pub fn snapshot(&self, key: &FeedKey) -> FeedSnapshot {
        let Some(seq) = lock(&self.sequences).get(key).cloned() else {
            return FeedSnapshot::default();
        };
        let mut state = lock(&seq);
        state.touched_at = Instant::now();
        state.snapshot(self.stale_time)
    }

    /// Fetch page 1 unless the key already has fresh pages or a fetch in
    /// flight. A stale sequence refetches page 1 and keeps its old pages
    /// readable until the new one lands.
    pub async fn load_first_page(&self, key: &FeedKey) -> FeedSnapshot {
        self.load(key, LoadMode::First).await
    }

    /// Fetch the following page. No-op while a fetch is in flight or when
    /// the sequence has ended.
    pub async fn load_next_page(&self, key: &FeedKey) -> FeedSnapshot {
        self.load(key, LoadMode::Next).await
    }

    /// Re-issue the fetch that last failed for this key.
    pub async fn retry(&self, key: &FeedKey) -> FeedSnapshot {
        self.load(key, LoadMode::Retry).await
    }

    /// Infinite-scroll trigger for the sentinel element.
    pub async fn on_sentinel_visible(&self, key: &FeedKey, intersecting: bool) -> FeedSnapshot {
        let snapshot = self.snapshot(key);
        if should_load_more(intersecting, snapshot.has_more, snapshot.is_busy()) {
            self.load_next_page(key).await
        } else {
            snapshot
        }
    }

    /// Drop a key's sequence; the next load starts again from page 1.
    pub fn invalidate(&self, key: &FeedKey) {
        debug!(media_type = %key.media_type, query = %key.query, "invalidating feed sequence");
        lock(&self.sequences).remove(key);
    }

    pub fn invalidate_all(&self) {
        lock(&self.sequences).clear();
    }

    /// Get or create the sequence for `key`, pruning idle ones on the way.
    fn sequence(&self, key: &FeedKey) -> SharedSequence {
        let now = Instant::now();
        let mut sequences = lock(&self.sequences);

        let before = sequences.len();
        sequences.retain(|k, seq| {
            let state = lock(seq);
            k == key
                || state.in_flight.is_some()
                || now.saturating_duration_since(state.touched_at) < self.retention
        });
        if sequences.len() < before {
            debug!(pruned = before - sequences.len(), "pruned idle feed sequences");
        }

        let seq = sequences
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(PageSequence::new(now))))
            .clone();
        lock(&seq).touched_at = now;
        seq
    }

    /// Whether `seq` is still the live sequence for `key`.
    fn is_current(&self, key: &FeedKey, seq: &SharedSequence) -> bool {
        lock(&self.sequences)
            .get(key)
            .is_some_and(|live| Arc::ptr_eq(live, seq))
    }

    async fn load(&self, key: &FeedKey, mode: LoadMode) -> FeedSnapshot {
        let seq = self.sequence(key);

        let page = {
            let mut state = lock(&seq);
            if state.in_flight.is_some() {
                return state.snapshot(self.stale_time);
            }
            let page = match mode {
                LoadMode::First if state.pages.is_empty() => Some(FeedConfig::FIRST_PAGE),
                LoadMode::First if state.is_stale(self.stale_time) => {
                    debug!(media_type = %key.media_type, "refreshing stale feed sequence");
                    Some(FeedConfig::FIRST_PAGE)
                }
                LoadMode::First => None,
                LoadMode::Next => state.next_page_param(),
                LoadMode::Retry => state.failed_page,
            };
            let Some(page) = page else {
                return state.snapshot(self.stale_time);
            };
            state.begin(page);
            page
        };

        let result = self.fetch_page(key, page).await;

        if !self.is_current(key, &seq) {
            debug!(page, "feed sequence invalidated while fetching; discarding page");
            return self.snapshot(key);
        }
        let mut state = lock(&seq);
        state.finish(page, result);
        state.snapshot(self.stale_time)
    }

    async fn fetch_page(&self, key: &FeedKey, page: u32) -> Result<ResultPage> {
        let (result, stats) = retry_async(
            &self.retry_policy,
            || self.request_page(key, page),
            |err: &PickerError| err.is_retryable(),
        )
        .await;

        match &result {
            Ok(p) => debug!(
                media_type = %key.media_type,
                page,
                items = p.items.len(),
                attempts = stats.attempts,
                "feed page loaded"
            ),
            Err(err) => warn!(
                media_type = %key.media_type,
                page,
                attempts = stats.attempts,
                error = %err,
                "feed page failed"
            ),
        }
        result
    }

    async fn request_page(&self, key: &FeedKey, page: u32) -> Result<ResultPage> {
        let filters = &key.filters;
        let per_page = Some(self.per_page);

        match (key.media_type, key.search_term()) {
            (MediaType::Photos, Some(query)) => {
                let params = PhotoSearchParams {
                    query: query.to_string(),
                    orientation: filters.orientation,
                    size: filters.size,
                    color: filters.color.clone(),
                    locale: None,
                    page: Some(page),
                    per_page,
                };
                let response = self.source.search_photos(&params).await?;
                Ok(ResultPage::from_photos(page, response))
            }
            (MediaType::Photos, None) => {
                let params = PaginationParams::new(page, self.per_page);
                let response = self.source.curated_photos(&params).await?;
                Ok(ResultPage::from_photos(page, response))
            }
            (MediaType::Videos, Some(query)) => {
                let params = VideoSearchParams {
                    query: query.to_string(),
                    orientation: filters.orientation,
                    size: filters.size,
                    page: Some(page),
                    per_page,
                };
                let response = self.source.search_videos(&params).await?;
                Ok(ResultPage::from_videos(page, response))
            }
            (MediaType::Videos, None) => {
                let params = VideoPopularParams {
                    min_duration: filters.min_duration,
                    max_duration: filters.max_duration,
                    page: Some(page),
                    per_page,
                    ..VideoPopularParams::default()
                };
                let response = self.source.popular_videos(&params).await?;
                Ok(ResultPage::from_videos(page, response))
            }
        }
    }
}
