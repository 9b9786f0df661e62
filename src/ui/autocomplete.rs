//! Destination autocomplete control, as a pure state machine.
//!
//! Rendering and async execution live in the TUI shell: the control emits
//! [`FetchRequest`] values for the owner to run, and completions re-enter
//! through [`Autocomplete::apply_trending`] / [`Autocomplete::apply_results`]
//! tagged with the generation token captured at request time. A token that
//! no longer matches means the triggering condition (mode, query) changed
//! while the fetch was in flight; such responses are discarded, which is
//! the sole cancellation mechanism.

use std::time::Instant;

use crossterm::event::KeyCode;

use crate::history::HistoryStore;
use crate::model::types::SuggestItem;
use crate::ui::compose::{self, ComposedList, DisplayMode};
use crate::ui::debounce::{Debouncer, QUERY_DEBOUNCE};

/// Async work the owner must start on behalf of the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Trending { token: u64 },
    Suggest { token: u64, query: String },
}

/// What a key event did; the owner reacts (redraw, focus handoff).
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Not a key the control cares about (or the control is closed).
    Ignored,
    /// Consumed; state may have changed.
    Handled,
    /// Closed without selecting (Escape, Tab). The owner decides whether
    /// default focus movement still applies (it does for Tab).
    Closed,
    /// A destination was committed; history is already updated.
    Selected(SuggestItem),
}

pub struct Autocomplete<S: HistoryStore> {
    store: S,
    open: bool,
    query: String,
    debounce: Debouncer,
    loading: bool,
    results: Vec<SuggestItem>,
    trending: Vec<SuggestItem>,
    history: Vec<SuggestItem>,
    highlight: Option<usize>,
    focused: bool,
    trending_token: u64,
    suggest_token: u64,
}

impl<S: HistoryStore> Autocomplete<S> {
    /// `initial` seeds the query text from an already-chosen destination.
    pub fn new(initial: Option<&SuggestItem>, store: S) -> Self {
        let query = initial.map(|item| item.label.clone()).unwrap_or_default();
        let history = store.load();
        Self {
            store,
            open: false,
            debounce: Debouncer::new(query.clone(), QUERY_DEBOUNCE),
            query,
            loading: false,
            results: Vec::new(),
            trending: Vec::new(),
            history,
            highlight: None,
            focused: false,
            trending_token: 0,
            suggest_token: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn history(&self) -> &[SuggestItem] {
        &self.history
    }

    pub fn mode(&self) -> DisplayMode {
        DisplayMode::for_query(self.debounce.settled())
    }

    /// The panel contents for rendering.
    pub fn composed(&self) -> ComposedList<'_> {
        compose::compose(
            self.mode(),
            &self.history,
            &self.trending,
            &self.results,
            self.debounce.settled(),
        )
    }

    /// Open on focus/click. Standby opens fetch trending; a query carried
    /// over from a prior selection refreshes its suggestions instead.
    pub fn open_via_focus(&mut self) -> Option<FetchRequest> {
        self.focused = true;
        if self.open {
            return None;
        }
        self.open = true;
        self.highlight = None;
        match self.mode() {
            DisplayMode::Standby => Some(self.begin_trending()),
            DisplayMode::Typing => Some(self.begin_suggest()),
        }
    }

    /// Close without selecting. In-flight fetches stay valid: a late
    /// resolution lands in hidden state, which a reopen shows as-is.
    pub fn close(&mut self) {
        self.open = false;
        self.focused = false;
        self.highlight = None;
    }

    /// Raw input edit. The highlight dies immediately; the fetch waits for
    /// the debounce window.
    pub fn set_query(&mut self, text: &str, now: Instant) {
        self.query = text.to_string();
        self.highlight = None;
        self.debounce.set(text, now);
    }

    /// The clear affordance: empty the text but stay open.
    pub fn clear_query(&mut self, now: Instant) {
        self.query.clear();
        self.results.clear();
        self.highlight = None;
        self.debounce.set("", now);
    }

    /// Drive the debounce timer. Emits at most one fetch request per
    /// quiescence period, for the final value typed.
    pub fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        if !self.debounce.poll(now) {
            return None;
        }
        if !self.open {
            return None;
        }
        match self.mode() {
            DisplayMode::Typing => {
                // Leaving standby invalidates any in-flight trending fetch.
                self.trending_token += 1;
                Some(self.begin_suggest())
            }
            DisplayMode::Standby => {
                // Query emptied while open: drop typing artifacts and any
                // in-flight suggestion fetch, back to standby.
                self.suggest_token += 1;
                self.results.clear();
                self.highlight = None;
                Some(self.begin_trending())
            }
        }
    }

    fn begin_trending(&mut self) -> FetchRequest {
        self.trending_token += 1;
        self.loading = true;
        FetchRequest::Trending {
            token: self.trending_token,
        }
    }

    fn begin_suggest(&mut self) -> FetchRequest {
        self.suggest_token += 1;
        self.loading = true;
        FetchRequest::Suggest {
            token: self.suggest_token,
            query: self.debounce.settled().trim().to_string(),
        }
    }

    /// Apply a trending fetch completion. Stale tokens are discarded.
    /// A source error is logged and shown as an empty list.
    pub fn apply_trending(&mut self, token: u64, outcome: anyhow::Result<Vec<SuggestItem>>) -> bool {
        if token != self.trending_token {
            return false;
        }
        self.loading = false;
        self.trending = outcome.unwrap_or_else(|err| {
            tracing::warn!("trending fetch failed: {err}");
            Vec::new()
        });
        true
    }

    /// Apply a suggestion fetch completion. A fresh non-empty result set
    /// seeds the highlight on its first item.
    pub fn apply_results(&mut self, token: u64, outcome: anyhow::Result<Vec<SuggestItem>>) -> bool {
        if token != self.suggest_token {
            return false;
        }
        self.loading = false;
        let items = outcome.unwrap_or_else(|err| {
            tracing::warn!("suggestion fetch failed: {err}");
            Vec::new()
        });
        self.highlight = if items.is_empty() { None } else { Some(0) };
        self.results = items;
        true
    }

    fn active_len(&self) -> usize {
        match self.mode() {
            DisplayMode::Typing => self.results.len(),
            DisplayMode::Standby => self.history.len() + self.trending.len(),
        }
    }

    fn flat_item(&self, index: usize) -> Option<&SuggestItem> {
        match self.mode() {
            DisplayMode::Typing => self.results.get(index),
            DisplayMode::Standby => {
                if index < self.history.len() {
                    self.history.get(index)
                } else {
                    self.trending.get(index - self.history.len())
                }
            }
        }
    }

    /// Keyboard contract while open. Closed controls ignore everything.
    pub fn on_key(&mut self, code: KeyCode) -> KeyOutcome {
        if !self.open {
            return KeyOutcome::Ignored;
        }
        match code {
            KeyCode::Esc | KeyCode::Tab => {
                self.close();
                KeyOutcome::Closed
            }
            KeyCode::Down => {
                self.highlight = compose::step_highlight(self.highlight, 1, self.active_len());
                KeyOutcome::Handled
            }
            KeyCode::Up => {
                self.highlight = compose::step_highlight(self.highlight, -1, self.active_len());
                KeyOutcome::Handled
            }
            KeyCode::Enter => {
                if let Some(item) = self.highlight.and_then(|idx| self.flat_item(idx)).cloned() {
                    return KeyOutcome::Selected(self.select(item));
                }
                if self.query.trim().is_empty() {
                    // Nothing highlighted, nothing typed: not an error.
                    return KeyOutcome::Ignored;
                }
                let free = SuggestItem::free(&self.query);
                KeyOutcome::Selected(self.select(free))
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Pointer selection at a flat index (click or tap on a row).
    pub fn select_at(&mut self, index: usize) -> Option<SuggestItem> {
        let item = self.flat_item(index).cloned()?;
        Some(self.select(item))
    }

    /// Hover moves the highlight without committing.
    pub fn set_highlight(&mut self, index: Option<usize>) {
        self.highlight = index;
    }

    fn select(&mut self, item: SuggestItem) -> SuggestItem {
        self.store.record(item.clone());
        self.history = self.store.load();
        self.query = item.label.clone();
        // Kill any pending debounce window so a stale emission can't
        // reopen a fetch after the control closed.
        self.debounce.reset(item.label.clone());
        self.open = false;
        self.focused = false;
        self.results.clear();
        self.highlight = None;
        item
    }
}
