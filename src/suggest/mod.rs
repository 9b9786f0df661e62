//! Destination suggestion sources.

pub mod catalog;

pub use catalog::CatalogSource;

use std::future::Future;

use anyhow::Result;

use crate::model::types::SuggestItem;

/// Async contract for destination lookups.
///
/// `suggest` is only ever called with a non-empty, trimmed query. Both
/// calls should resolve to an empty list rather than fail when nothing
/// matches; callers treat an `Err` the same as an empty result set (logged,
/// never surfaced to the user).
pub trait SuggestSource: Send + Sync + 'static {
    /// Ranked candidates for a partial query.
    fn suggest(&self, query: &str) -> impl Future<Output = Result<Vec<SuggestItem>>> + Send;

    /// Currently trending destinations, shown when the query is empty.
    fn trending(&self) -> impl Future<Output = Result<Vec<SuggestItem>>> + Send;
}
