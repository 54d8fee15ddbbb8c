//! Host-facing picker session.
//!
//! A [`PickerSession`] wraps one [`PickerStore`] together with the host's
//! options and callbacks. The presentation layer forwards user events to the
//! session; the session mutates the store and reports changes back through
//! [`PickerCallbacks`].
//!
//! Change callbacks fire only when the observed value actually changed.
//! Selection changes are reported as a diff against the previous selection
//! carrying the first added and the first removed item.

use crate::config::{FeedConfig, UiConfig};
use crate::error::PickerError;
use crate::format::format_template;
use crate::media::{FilterState, FilterUpdate, MediaItem, MediaType};
use crate::pagination::{FeedKey, FeedSnapshot};
use crate::search_input::SearchInput;
use crate::store::{PickerState, PickerStore, ToastSeverity, ToggleOutcome};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// User-visible strings. `max_selection_warning` takes `{max}` and
/// `selected_count` takes `{count}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerTexts {
    pub title: String,
    pub confirm: String,
    pub cancel: String,
    pub search_placeholder: String,
    pub photos_tab: String,
    pub videos_tab: String,
    pub empty_message: String,
    pub error_message: String,
    pub loading_text: String,
    pub max_selection_warning: String,
    pub selected_count: String,
}

impl Default for PickerTexts {
    fn default() -> Self {
        Self {
            title: "Select Media".into(),
            confirm: "Confirm".into(),
            cancel: "Cancel".into(),
            search_placeholder: "Search...".into(),
            photos_tab: "Photos".into(),
            videos_tab: "Videos".into(),
            empty_message: "No results found".into(),
            error_message: "Failed to load media".into(),
            loading_text: "Loading...".into(),
            max_selection_warning: "Maximum {max} items allowed".into(),
            selected_count: "{count} item(s) selected".into(),
        }
    }
}

impl PickerTexts {
    pub fn max_selection_warning(&self, max: usize) -> String {
        format_template(&self.max_selection_warning, &[("max", max.to_string())])
    }

    /// "3 items selected", "1 item selected".
    pub fn selected_count(&self, count: usize) -> String {
        format_template(&self.selected_count, &[("count", count.to_string())])
            .replacen("(s)", if count > 1 { "s" } else { "" }, 1)
    }
}

/// Behaviour and defaults of a picker session.
#[derive(Debug, Clone)]
pub struct PickerOptions {
    pub multiple: bool,
    pub max_selection: usize,
    pub min_selection: usize,
    pub default_media_type: MediaType,
    pub default_query: Option<String>,
    pub default_filters: Option<FilterState>,
    pub show_search: bool,
    pub show_tabs: bool,
    pub show_filters: bool,
    pub enable_preview: bool,
    pub close_on_backdrop: bool,
    pub close_on_escape: bool,
    pub per_page: u32,
    pub texts: PickerTexts,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            multiple: false,
            max_selection: UiConfig::DEFAULT_MAX_SELECTION,
            min_selection: UiConfig::DEFAULT_MIN_SELECTION,
            default_media_type: MediaType::Photos,
            default_query: None,
            default_filters: None,
            show_search: true,
            show_tabs: true,
            show_filters: true,
            enable_preview: true,
            close_on_backdrop: true,
            close_on_escape: true,
            per_page: FeedConfig::DEFAULT_PER_PAGE,
            texts: PickerTexts::default(),
        }
    }
}

impl PickerOptions {
    pub fn multiple(mut self, max_selection: usize) -> Self {
        self.multiple = true;
        self.max_selection = max_selection;
        self
    }

    pub fn min_selection(mut self, min: usize) -> Self {
        self.min_selection = min;
        self
    }

    pub fn default_media_type(mut self, media_type: MediaType) -> Self {
        self.default_media_type = media_type;
        self
    }

    pub fn default_query(mut self, query: impl Into<String>) -> Self {
        self.default_query = Some(query.into());
        self
    }

    pub fn default_filters(mut self, filters: FilterState) -> Self {
        self.default_filters = Some(filters);
        self
    }

    pub fn enable_preview(mut self, enabled: bool) -> Self {
        self.enable_preview = enabled;
        self
    }

    pub fn close_on_backdrop(mut self, enabled: bool) -> Self {
        self.close_on_backdrop = enabled;
        self
    }

    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    pub fn texts(mut self, texts: PickerTexts) -> Self {
        self.texts = texts;
        self
    }
}

/// Result handed to `on_select`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Confirmed {
    Single(MediaItem),
    Multiple(Vec<MediaItem>),
}

impl Confirmed {
    pub fn items(&self) -> Vec<&MediaItem> {
        match self {
            Confirmed::Single(item) => vec![item],
            Confirmed::Multiple(items) => items.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionChangeEvent {
    pub selected: Vec<MediaItem>,
    pub added: Option<MediaItem>,
    pub removed: Option<MediaItem>,
    pub count: usize,
}

/// Toast routed to the host instead of the built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastOptions {
    pub message: String,
    pub severity: ToastSeverity,
}

/// Host callbacks, all optional. Built with the `on_*` methods.
#[derive(Default)]
pub struct PickerCallbacks {
    on_select: Option<Box<dyn FnMut(Confirmed) + Send>>,
    on_cancel: Option<Box<dyn FnMut() + Send>>,
    on_selection_change: Option<Box<dyn FnMut(&SelectionChangeEvent) + Send>>,
    on_max_selection_reached: Option<Box<dyn FnMut(usize) + Send>>,
    on_media_type_change: Option<Box<dyn FnMut(MediaType) + Send>>,
    on_search_change: Option<Box<dyn FnMut(&str) + Send>>,
    on_filters_change: Option<Box<dyn FnMut(&FilterState) + Send>>,
    on_preview: Option<Box<dyn FnMut(&MediaItem) + Send>>,
    on_error: Option<Box<dyn FnMut(&PickerError) + Send>>,
    on_toast: Option<Box<dyn FnMut(&ToastOptions) + Send>>,
}

impl std::fmt::Debug for PickerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerCallbacks")
            .field("on_select", &self.on_select.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("on_toast", &self.on_toast.is_some())
            .finish_non_exhaustive()
    }
}

impl PickerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_select(mut self, f: impl FnMut(Confirmed) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn on_selection_change(
        mut self,
        f: impl FnMut(&SelectionChangeEvent) + Send + 'static,
    ) -> Self {
        self.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn on_max_selection_reached(mut self, f: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_max_selection_reached = Some(Box::new(f));
        self
    }

    pub fn on_media_type_change(mut self, f: impl FnMut(MediaType) + Send + 'static) -> Self {
        self.on_media_type_change = Some(Box::new(f));
        self
    }

    pub fn on_search_change(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_search_change = Some(Box::new(f));
        self
    }

    pub fn on_filters_change(mut self, f: impl FnMut(&FilterState) + Send + 'static) -> Self {
        self.on_filters_change = Some(Box::new(f));
        self
    }

    pub fn on_preview(mut self, f: impl FnMut(&MediaItem) + Send + 'static) -> Self {
        self.on_preview = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&PickerError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Route toasts to the host; the built-in toast stays hidden.
    pub fn on_toast(mut self, f: impl FnMut(&ToastOptions) + Send + 'static) -> Self {
        self.on_toast = Some(Box::new(f));
        self
    }

    pub fn has_toast_handler(&self) -> bool {
        self.on_toast.is_some()
    }
}

/// Last values reported to the host.
#[derive(Debug, Clone, Default)]
struct Observed {
    media_type: MediaType,
    query: String,
    filters: FilterState,
    selected: Vec<MediaItem>,
}

/// One open-to-close interaction with the picker.
#[derive(Debug)]
pub struct PickerSession {
    options: PickerOptions,
    callbacks: PickerCallbacks,
    store: PickerStore,
    search: SearchInput,
    open: bool,
    observed: Observed,
}

impl PickerSession {
    pub fn new(options: PickerOptions, callbacks: PickerCallbacks) -> Self {
        Self {
            options,
            callbacks,
            store: PickerStore::new(),
            search: SearchInput::new(),
            open: false,
            observed: Observed::default(),
        }
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    pub fn texts(&self) -> &PickerTexts {
        &self.options.texts
    }

    pub fn state(&self) -> &PickerState {
        self.store.state()
    }

    pub fn store(&self) -> &PickerStore {
        &self.store
    }

    pub fn search(&self) -> &SearchInput {
        &self.search
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.store.state().is_selected(id)
    }

    /// Feed key for the current tab, query and filters.
    pub fn feed_key(&self) -> FeedKey {
        let state = self.store.state();
        FeedKey::new(state.media_type, state.query.clone(), state.filters.clone())
    }

    /// Open the picker and apply the configured defaults.
    pub fn open(&mut self) {
        info!(session = %self.store.id(), "picker opened");
        self.open = true;
        self.store.set_media_type(self.options.default_media_type);
        if let Some(query) = self.options.default_query.as_deref().filter(|q| !q.is_empty()) {
            self.store.set_query(query);
        }
        if let Some(filters) = self.options.default_filters.clone() {
            self.store.set_filters(filters);
        }
        self.sync();
    }

    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.store.set_media_type(media_type);
        self.sync();
    }

    /// Replace the query directly, bypassing the debounce.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.store.set_query(query);
        self.sync();
    }

    pub fn set_filter(&mut self, update: FilterUpdate) {
        self.store.set_filter(update);
        self.sync();
    }

    pub fn reset_filters(&mut self) {
        self.store.reset_filters();
        self.sync();
    }

    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search.input(text, now);
    }

    pub fn search_composition_start(&mut self) {
        self.search.composition_start();
    }

    pub fn search_composition_end(&mut self, now: Instant) {
        self.search.composition_end(now);
    }

    pub fn clear_search(&mut self) {
        let query = self.search.clear();
        self.set_query(query);
    }

    /// Commit a debounced query if it is due. Returns true when the query
    /// changed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(query) if query != self.store.state().query => {
                self.set_query(query);
                true
            }
            _ => false,
        }
    }

    /// Select or deselect an item, honouring the capacity limit.
    pub fn toggle(&mut self, item: MediaItem) -> ToggleOutcome {
        let state = self.store.state();
        if self.options.multiple
            && !state.is_selected(item.id)
            && state.selected_count() >= self.options.max_selection
        {
            self.max_selection_reached();
            return ToggleOutcome::Rejected;
        }

        let outcome =
            self.store
                .toggle_select(item, self.options.multiple, self.options.max_selection);
        self.sync();
        outcome
    }

    fn max_selection_reached(&mut self) {
        let max = self.options.max_selection;
        let message = self.options.texts.max_selection_warning(max);
        debug!(session = %self.store.id(), max, "max selection reached");

        match self.callbacks.on_toast.as_mut() {
            Some(on_toast) => on_toast(&ToastOptions {
                message,
                severity: ToastSeverity::Warning,
            }),
            None => self.store.show_warning(message),
        }
        if let Some(cb) = self.callbacks.on_max_selection_reached.as_mut() {
            cb(max);
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.store.hide_toast();
    }

    /// Auto-dismiss the built-in toast once its time is up. Returns true
    /// when it just went hidden.
    pub fn poll_toast(&mut self, now: Instant) -> bool {
        self.store.expire_toast(now)
    }

    pub fn can_confirm(&self) -> bool {
        let count = self.store.state().selected_count();
        count >= self.options.min_selection && count > 0
    }

    /// "2 items selected", or `None` with nothing selected.
    pub fn selected_count_text(&self) -> Option<String> {
        let count = self.store.state().selected_count();
        (count > 0).then(|| self.options.texts.selected_count(count))
    }

    /// Deliver the selection and close. Does nothing unless
    /// [`can_confirm`](Self::can_confirm) holds.
    pub fn confirm(&mut self) -> Option<Confirmed> {
        if !self.can_confirm() {
            debug!(session = %self.store.id(), "confirm ignored; selection below minimum");
            return None;
        }

        let selected = self.store.selected();
        let payload = if self.options.multiple {
            Confirmed::Multiple(selected.to_vec())
        } else {
            Confirmed::Single(selected[0].clone())
        };
        info!(session = %self.store.id(), count = selected.len(), "selection confirmed");

        if let Some(cb) = self.callbacks.on_select.as_mut() {
            cb(payload.clone());
        }
        self.close();
        Some(payload)
    }

    pub fn cancel(&mut self) {
        info!(session = %self.store.id(), "picker cancelled");
        if let Some(cb) = self.callbacks.on_cancel.as_mut() {
            cb();
        }
        self.close();
    }

    /// Returns true when the click closed the picker.
    pub fn backdrop_click(&mut self) -> bool {
        if self.options.close_on_backdrop {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// Returns true when the key closed the picker.
    pub fn escape_pressed(&mut self) -> bool {
        if self.options.close_on_escape {
            self.cancel();
            true
        } else {
            false
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.store.reset();
        self.sync();
    }

    /// Open the lightbox on `items[index]`. Returns false when previews are
    /// disabled or `index` is out of range.
    pub fn open_preview(&mut self, index: usize, items: &[MediaItem]) -> bool {
        if !self.options.enable_preview {
            return false;
        }
        let Some(item) = items.get(index) else {
            return false;
        };
        self.store.set_preview_index(Some(index));
        if let Some(cb) = self.callbacks.on_preview.as_mut() {
            cb(item);
        }
        true
    }

    pub fn navigate_preview(&mut self, index: usize) {
        if self.store.state().preview_index.is_some() {
            self.store.set_preview_index(Some(index));
        }
    }

    pub fn close_preview(&mut self) {
        self.store.set_preview_index(None);
    }

    /// Toggle the item under the lightbox. In single mode, picking a new
    /// item also closes the lightbox.
    pub fn select_in_preview(&mut self, items: &[MediaItem]) -> Option<ToggleOutcome> {
        let index = self.store.state().preview_index?;
        let item = items.get(index)?.clone();
        let was_selected = self.is_selected(item.id);

        let outcome = self.toggle(item);
        if !self.options.multiple && !was_selected {
            self.close_preview();
        }
        Some(outcome)
    }

    pub fn report_error(&mut self, error: &PickerError) {
        if let Some(cb) = self.callbacks.on_error.as_mut() {
            cb(error);
        }
    }

    /// Forward a failed feed state to `on_error`. Returns true if it did.
    pub fn report_feed_error(&mut self, snapshot: &FeedSnapshot) -> bool {
        let Some(message) = snapshot.error.clone() else {
            return false;
        };
        let error = match snapshot.error_status {
            Some(status) => PickerError::Api { status, message },
            None => PickerError::Other(message),
        };
        self.report_error(&error);
        true
    }

    /// Fire change callbacks for whatever moved since the last call.
    fn sync(&mut self) {
        let state = self.store.state();

        if state.media_type != self.observed.media_type {
            self.observed.media_type = state.media_type;
            if let Some(cb) = self.callbacks.on_media_type_change.as_mut() {
                cb(state.media_type);
            }
        }

        if state.query != self.observed.query {
            self.observed.query = state.query.clone();
            self.search.sync_external(&state.query);
            if let Some(cb) = self.callbacks.on_search_change.as_mut() {
                cb(&state.query);
            }
        }

        if state.filters != self.observed.filters {
            self.observed.filters = state.filters.clone();
            if let Some(cb) = self.callbacks.on_filters_change.as_mut() {
                cb(&state.filters);
            }
        }

        let previous = &self.observed.selected;
        let added = state
            .selected
            .iter()
            .find(|item| !previous.iter().any(|p| p.id == item.id))
            .cloned();
        let removed = previous
            .iter()
            .find(|item| !state.selected.iter().any(|c| c.id == item.id))
            .cloned();

        if added.is_some() || removed.is_some() {
            let event = SelectionChangeEvent {
                selected: state.selected.clone(),
                added,
                removed,
                count: state.selected.len(),
            };
            if let Some(cb) = self.callbacks.on_selection_change.as_mut() {
                cb(&event);
            }
        }
        self.observed.selected = state.selected.clone();
    }
}
