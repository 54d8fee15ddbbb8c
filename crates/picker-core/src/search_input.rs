//! Debounced search box.
//!
//! Keystrokes only commit a query once the input has been quiet for the
//! debounce interval. While an IME composition is active nothing is
//! scheduled; ending the composition starts the countdown. The caller owns
//! the clock and drives the machine with [`SearchInput::poll`].

use crate::config::UiConfig;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInputState {
    Idle,
    Composing,
    PendingCommit(Instant),
}

#[derive(Debug, Clone)]
pub struct SearchInput {
    text: String,
    state: SearchInputState,
    debounce: Duration,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchInput {
    pub fn new() -> Self {
        Self::with_debounce(UiConfig::SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            text: String::new(),
            state: SearchInputState::Idle,
            debounce,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> SearchInputState {
        self.state
    }

    pub fn is_composing(&self) -> bool {
        self.state == SearchInputState::Composing
    }

    /// When the pending commit fires, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SearchInputState::PendingCommit(at) => Some(at),
            _ => None,
        }
    }

    /// Record new input text.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        if !self.is_composing() {
            self.state = SearchInputState::PendingCommit(now + self.debounce);
        }
    }

    pub fn composition_start(&mut self) {
        self.state = SearchInputState::Composing;
    }

    pub fn composition_end(&mut self, now: Instant) {
        self.state = SearchInputState::PendingCommit(now + self.debounce);
    }

    /// Empty the box and commit the empty query right away.
    pub fn clear(&mut self) -> String {
        self.text.clear();
        self.state = SearchInputState::Idle;
        String::new()
    }

    /// Commit the text if the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.state {
            SearchInputState::PendingCommit(at) if now >= at => {
                self.state = SearchInputState::Idle;
                Some(self.text.clone())
            }
            _ => None,
        }
    }

    /// Mirror a query that changed outside the box. Drops a pending commit.
    pub fn sync_external(&mut self, query: &str) {
        if self.text != query {
            self.text = query.to_string();
            if !self.is_composing() {
                self.state = SearchInputState::Idle;
            }
        }
    }
}
