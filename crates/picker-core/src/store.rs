//! Per-session picker state.
//!
//! Every picker session owns its own [`PickerStore`]; two pickers open at the
//! same time never share a selection. All mutation goes through the action
//! methods below.

use crate::config::UiConfig;
use crate::media::{FilterState, FilterUpdate, MediaItem, MediaType};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Info,
    #[default]
    Warning,
    Error,
    Success,
}

/// Transient notice shown over the grid. At most one at a time.
///
/// `visible` drops to false once `expires_at` has passed and
/// [`PickerStore::expire_toast`] is polled; the message stays around so the
/// presentation layer can animate it out before calling `hide_toast`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastState {
    pub message: String,
    pub severity: ToastSeverity,
    pub visible: bool,
    #[serde(skip)]
    pub expires_at: Instant,
}

/// Snapshot of everything the picker renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickerState {
    pub media_type: MediaType,
    pub query: String,
    pub filters: FilterState,
    /// Ordered by selection time, unique by id.
    pub selected: Vec<MediaItem>,
    pub preview_index: Option<usize>,
    pub toast: Option<ToastState>,
}

impl PickerState {
    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.iter().any(|m| m.id == id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }
}

/// What a toggle did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Single-select mode swapped the previous item out.
    Replaced,
    /// Multi-select at capacity; nothing changed.
    Rejected,
}

impl ToggleOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, ToggleOutcome::Rejected)
    }
}

#[derive(Debug, Clone)]
pub struct PickerStore {
    id: Uuid,
    state: PickerState,
}

impl Default for PickerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PickerStore {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: PickerState::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn selected(&self) -> &[MediaItem] {
        &self.state.selected
    }

    /// Switch tabs. Filters and selection do not carry over.
    pub fn set_media_type(&mut self, media_type: MediaType) {
        debug!(store = %self.id, %media_type, "media type set");
        self.state.media_type = media_type;
        self.state.filters = FilterState::default();
        self.state.selected.clear();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn set_filter(&mut self, update: FilterUpdate) {
        self.state.filters.apply(update);
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.state.filters = filters;
    }

    pub fn reset_filters(&mut self) {
        self.state.filters = FilterState::default();
    }

    /// Select or deselect `item`.
    ///
    /// Deselecting is always allowed. In single mode a new item replaces the
    /// current one; in multi mode it is appended only below `max_selection`.
    pub fn toggle_select(
        &mut self,
        item: MediaItem,
        multiple: bool,
        max_selection: usize,
    ) -> ToggleOutcome {
        let selected = &mut self.state.selected;

        if let Some(index) = selected.iter().position(|m| m.id == item.id) {
            selected.remove(index);
            return ToggleOutcome::Removed;
        }

        if !multiple {
            let outcome = if selected.is_empty() {
                ToggleOutcome::Added
            } else {
                ToggleOutcome::Replaced
            };
            *selected = vec![item];
            return outcome;
        }

        if selected.len() < max_selection {
            selected.push(item);
            ToggleOutcome::Added
        } else {
            debug!(store = %self.id, max_selection, "selection at capacity");
            ToggleOutcome::Rejected
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.selected.clear();
    }

    pub fn set_preview_index(&mut self, index: Option<usize>) {
        self.state.preview_index = index;
    }

    /// Show a toast, replacing any visible one.
    pub fn show_toast(&mut self, message: impl Into<String>, severity: ToastSeverity) {
        self.show_toast_at(message, severity, Instant::now());
    }

    pub fn show_toast_at(
        &mut self,
        message: impl Into<String>,
        severity: ToastSeverity,
        now: Instant,
    ) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            severity,
            visible: true,
            expires_at: now + UiConfig::TOAST_DURATION,
        });
    }

    /// Auto-dismiss a toast whose display time is over. Returns true when
    /// this call hid it.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        match self.state.toast.as_mut() {
            Some(toast) if toast.visible && now >= toast.expires_at => {
                toast.visible = false;
                true
            }
            _ => false,
        }
    }

    pub fn show_warning(&mut self, message: impl Into<String>) {
        self.show_toast(message, ToastSeverity::default());
    }

    pub fn hide_toast(&mut self) {
        self.state.toast = None;
    }

    /// Back to the initial state. The instance id is kept.
    pub fn reset(&mut self) {
        debug!(store = %self.id, "store reset");
        self.state = PickerState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fixtures;
    use crate::media::{Orientation, Size};

    fn item(id: u64) -> MediaItem {
        MediaItem::from(&fixtures::photo(id))
    }

    fn ids(store: &PickerStore) -> Vec<u64> {
        store.selected().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_initial_state() {
        let store = PickerStore::new();
        assert_eq!(*store.state(), PickerState::default());
        assert_eq!(store.state().media_type, MediaType::Photos);
        assert!(store.state().toast.is_none());
    }

    #[test]
    fn test_multi_select_respects_capacity() {
        let mut store = PickerStore::new();
        assert_eq!(store.toggle_select(item(1), true, 2), ToggleOutcome::Added);
        assert_eq!(store.toggle_select(item(2), true, 2), ToggleOutcome::Added);
        assert_eq!(store.toggle_select(item(3), true, 2), ToggleOutcome::Rejected);
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn test_deselect_allowed_at_capacity() {
        let mut store = PickerStore::new();
        store.toggle_select(item(1), true, 2);
        store.toggle_select(item(2), true, 2);
        assert_eq!(store.toggle_select(item(1), true, 2), ToggleOutcome::Removed);
        assert_eq!(ids(&store), vec![2]);

        // The freed slot takes exactly one more item.
        assert_eq!(store.toggle_select(item(3), true, 2), ToggleOutcome::Added);
        assert_eq!(store.toggle_select(item(4), true, 2), ToggleOutcome::Rejected);
        assert_eq!(ids(&store), vec![2, 3]);
    }

    #[test]
    fn test_single_select_replaces() {
        let mut store = PickerStore::new();
        assert_eq!(store.toggle_select(item(1), false, 10), ToggleOutcome::Added);
        assert_eq!(store.toggle_select(item(2), false, 10), ToggleOutcome::Replaced);
        assert_eq!(ids(&store), vec![2]);
        assert_eq!(store.toggle_select(item(2), false, 10), ToggleOutcome::Removed);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let mut store = PickerStore::new();
        assert_eq!(store.toggle_select(item(1), true, 0), ToggleOutcome::Rejected);
        assert!(!ToggleOutcome::Rejected.changed());
    }

    #[test]
    fn test_media_type_switch_resets_filters_and_selection() {
        let mut store = PickerStore::new();
        store.set_filter(FilterUpdate::Orientation(Some(Orientation::Square)));
        store.toggle_select(item(1), true, 5);
        store.set_query("forest");

        store.set_media_type(MediaType::Videos);
        assert_eq!(store.state().media_type, MediaType::Videos);
        assert!(store.state().filters.is_empty());
        assert!(store.selected().is_empty());
        assert_eq!(store.state().query, "forest");
    }

    #[test]
    fn test_filters_and_reset() {
        let mut store = PickerStore::new();
        store.set_filter(FilterUpdate::Size(Some(Size::Large)));
        store.set_filter(FilterUpdate::Color(Some("blue".into())));
        assert_eq!(store.state().filters.size, Some(Size::Large));
        store.reset_filters();
        assert!(store.state().filters.is_empty());
    }

    #[test]
    fn test_toast_last_write_wins() {
        let mut store = PickerStore::new();
        store.show_warning("first");
        store.show_toast("second", ToastSeverity::Error);
        let toast = store.state().toast.clone().unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.severity, ToastSeverity::Error);
        assert!(toast.visible);
        store.hide_toast();
        assert!(store.state().toast.is_none());
    }

    #[test]
    fn test_toast_expires_after_duration() {
        let start = Instant::now();
        let mut store = PickerStore::new();
        store.show_toast_at("full", ToastSeverity::Warning, start);

        assert!(!store.expire_toast(start + UiConfig::TOAST_DURATION / 2));
        assert!(store.state().toast.as_ref().unwrap().visible);

        assert!(store.expire_toast(start + UiConfig::TOAST_DURATION));
        let toast = store.state().toast.clone().unwrap();
        assert!(!toast.visible);
        assert_eq!(toast.message, "full");
        assert!(!store.expire_toast(start + UiConfig::TOAST_DURATION * 2));
    }

    #[test]
    fn test_new_toast_restarts_the_clock() {
        let start = Instant::now();
        let mut store = PickerStore::new();
        store.show_toast_at("first", ToastSeverity::Info, start);
        store.show_toast_at("second", ToastSeverity::Info, start + UiConfig::TOAST_DURATION / 2);

        assert!(!store.expire_toast(start + UiConfig::TOAST_DURATION));
        assert!(store.expire_toast(start + UiConfig::TOAST_DURATION * 2));
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut store = PickerStore::new();
        let id = store.id();
        store.set_media_type(MediaType::Videos);
        store.set_preview_index(Some(3));
        store.reset();
        assert_eq!(*store.state(), PickerState::default());
        assert_eq!(store.id(), id);
    }

    #[test]
    fn test_stores_are_independent() {
        let mut a = PickerStore::new();
        let b = PickerStore::new();
        a.toggle_select(item(1), false, 1);
        assert!(b.selected().is_empty());
        assert_ne!(a.id(), b.id());
    }
}
