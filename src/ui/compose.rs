//! List composition for the open autocomplete panel.
//!
//! Standby mode shows labeled groups (history, then trending); typing mode
//! shows a flat result list or a non-selectable "no results" notice. The
//! keyboard cursor addresses one flat, zero-based sequence of selectable
//! items regardless of the visual grouping.

use crate::model::types::SuggestItem;

pub const HISTORY_GROUP_TITLE: &str = "Search History";
pub const TRENDING_GROUP_TITLE: &str = "Trending Destinations";

pub const HISTORY_GLYPH: &str = "↺";
pub const TRENDING_GLYPH: &str = "▲";

/// Selected by whether the debounced, trimmed query is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Standby,
    Typing,
}

impl DisplayMode {
    pub fn for_query(debounced: &str) -> Self {
        if debounced.trim().is_empty() {
            DisplayMode::Standby
        } else {
            DisplayMode::Typing
        }
    }
}

/// A labeled section of the standby list.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestGroup<'a> {
    pub title: &'static str,
    pub glyph: &'static str,
    pub items: &'a [SuggestItem],
}

/// What the open panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposedList<'a> {
    /// History then trending; empty groups are omitted entirely.
    Standby(Vec<SuggestGroup<'a>>),
    /// Fetched results for the debounced query.
    Results(&'a [SuggestItem]),
    /// The fetch resolved with zero items. Not selectable.
    NoResults { query: String },
}

pub fn compose<'a>(
    mode: DisplayMode,
    history: &'a [SuggestItem],
    trending: &'a [SuggestItem],
    results: &'a [SuggestItem],
    debounced_query: &str,
) -> ComposedList<'a> {
    match mode {
        DisplayMode::Standby => {
            let mut groups = Vec::new();
            if !history.is_empty() {
                groups.push(SuggestGroup {
                    title: HISTORY_GROUP_TITLE,
                    glyph: HISTORY_GLYPH,
                    items: history,
                });
            }
            if !trending.is_empty() {
                groups.push(SuggestGroup {
                    title: TRENDING_GROUP_TITLE,
                    glyph: TRENDING_GLYPH,
                    items: trending,
                });
            }
            ComposedList::Standby(groups)
        }
        DisplayMode::Typing => {
            if results.is_empty() {
                ComposedList::NoResults {
                    query: debounced_query.trim().to_string(),
                }
            } else {
                ComposedList::Results(results)
            }
        }
    }
}

impl ComposedList<'_> {
    /// Number of selectable positions in the flat sequence.
    pub fn len(&self) -> usize {
        match self {
            ComposedList::Standby(groups) => groups.iter().map(|g| g.items.len()).sum(),
            ComposedList::Results(items) => items.len(),
            ComposedList::NoResults { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item at a flat index, counting groups in presentation order.
    pub fn get(&self, index: usize) -> Option<&SuggestItem> {
        match self {
            ComposedList::Standby(groups) => {
                let mut remaining = index;
                for group in groups {
                    if remaining < group.items.len() {
                        return group.items.get(remaining);
                    }
                    remaining -= group.items.len();
                }
                None
            }
            ComposedList::Results(items) => items.get(index),
            ComposedList::NoResults { .. } => None,
        }
    }
}

/// Circular cursor step over a flat list of length `len`; `None` stands
/// for "nothing highlighted" and behaves as the position before the first
/// item. A step on an empty list is a no-op.
pub fn step_highlight(current: Option<usize>, delta: i32, len: usize) -> Option<usize> {
    if len == 0 {
        return current;
    }
    let n = len as i64;
    let h = current.map_or(-1, |v| v as i64);
    Some((((h + i64::from(delta)) % n + n) % n) as usize)
}
