//! Core data types shared by the search form, its sources, and the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A destination candidate, as produced by a suggestion source, the
/// trending feed, or the persisted history. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestItem {
    /// Unique within a single result set.
    pub id: String,
    /// Display text; never empty.
    pub label: String,
    /// Popularity count, when the source tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
}

/// How an item came to exist, when it didn't come from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Typed by the user and committed without picking a suggestion.
    Free,
}

impl SuggestItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            count: None,
            kind: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// A free-text selection: the user pressed Enter on text that matched
    /// no suggestion. The label is the trimmed input.
    pub fn free(text: &str) -> Self {
        let label = text.trim();
        Self {
            id: format!("free:{label}"),
            label: label.to_string(),
            count: None,
            kind: Some(ItemKind::Free),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.kind, Some(ItemKind::Free))
    }
}

/// Inclusive stay range picked in the date step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("stay cannot end before it starts ({start} > {end})")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    /// Invariant: `start <= end`. A same-day range is allowed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// The multi-step form's state. Owned exclusively by the coordinator;
/// everything else gets read-only views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchFormState {
    pub destination: Option<SuggestItem>,
    pub dates: Option<DateRange>,
    pub guests: u32,
}

impl Default for SearchFormState {
    fn default() -> Self {
        Self {
            destination: None,
            dates: None,
            guests: 1,
        }
    }
}

/// Named mutations; each replaces exactly one field and preserves the
/// others, so the state is never partially invalid mid-transition.
#[derive(Debug, Clone)]
pub enum FormAction {
    SetDestination(SuggestItem),
    SetDates(DateRange),
    SetGuests(u32),
}

impl SearchFormState {
    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::SetDestination(item) => self.destination = Some(item),
            FormAction::SetDates(range) => self.dates = Some(range),
            // At least one guest, no matter what the caller hands us.
            FormAction::SetGuests(n) => self.guests = n.max(1),
        }
    }
}
