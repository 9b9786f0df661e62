//! Built-in destination catalog, the default suggestion source.
//!
//! Stands in for the booking service's suggest endpoint: case-insensitive
//! substring matching capped at [`SUGGEST_LIMIT`], trending ranked by
//! recent search volume. Optional simulated latency makes the TUI behave
//! like it would against a remote service.

use std::time::Duration;

use anyhow::Result;

use super::SuggestSource;
use crate::model::types::SuggestItem;

/// Cap mirrored from the remote suggest endpoint.
pub const SUGGEST_LIMIT: usize = 8;
pub const TRENDING_LIMIT: usize = 3;

struct CityRecord {
    slug: &'static str,
    label: &'static str,
    searches: u32,
}

const CITIES: &[CityRecord] = &[
    CityRecord { slug: "tehran", label: "Tehran", searches: 12 },
    CityRecord { slug: "berlin", label: "Berlin", searches: 7 },
    CityRecord { slug: "hamburg", label: "Hamburg", searches: 5 },
    CityRecord { slug: "munich", label: "Munich", searches: 4 },
    CityRecord { slug: "cologne", label: "Cologne", searches: 3 },
    CityRecord { slug: "kish-island", label: "Kish Island", searches: 2 },
    CityRecord { slug: "shiraz", label: "Shiraz", searches: 2 },
];

fn to_item(rec: &CityRecord) -> SuggestItem {
    SuggestItem::new(format!("loc:{}", rec.slug), rec.label).with_count(rec.searches)
}

#[derive(Clone, Default)]
pub struct CatalogSource {
    latency: Option<Duration>,
}

impl CatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering, to mimic a network round trip.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Every destination, most searched first. Backs the browse list on
    /// the home screen.
    pub fn all(&self) -> Vec<SuggestItem> {
        let mut items: Vec<SuggestItem> = CITIES.iter().map(to_item).collect();
        items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        items
    }
}

impl SuggestSource for CatalogSource {
    async fn suggest(&self, query: &str) -> Result<Vec<SuggestItem>> {
        self.delay().await;
        let needle = query.to_lowercase();
        Ok(CITIES
            .iter()
            .filter(|rec| rec.label.to_lowercase().contains(&needle))
            .take(SUGGEST_LIMIT)
            .map(to_item)
            .collect())
    }

    async fn trending(&self) -> Result<Vec<SuggestItem>> {
        self.delay().await;
        let mut ranked: Vec<&CityRecord> = CITIES.iter().collect();
        ranked.sort_by(|a, b| b.searches.cmp(&a.searches).then_with(|| a.label.cmp(b.label)));
        Ok(ranked.into_iter().take(TRENDING_LIMIT).map(to_item).collect())
    }
}
