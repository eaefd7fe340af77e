//! Read-only walk through the cache: fuzzy name, then series, then episode.

use std::sync::Arc;

use showforged_common::EpisodeSelector;
use showforged_db::models::{EpisodeRecord, SeriesRecord};
use tracing::{debug, warn};

use super::store::RecordStore;

/// What a lookup found, and what it could not find.
///
/// Storage errors are logged and reported as misses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupResult {
    pub series: Option<SeriesRecord>,
    pub episode: Option<EpisodeRecord>,
    pub series_miss: bool,
    pub episode_miss: bool,
}

impl LookupResult {
    fn series_miss() -> Self {
        Self {
            series_miss: true,
            ..Default::default()
        }
    }

    /// True when nothing needs fetching.
    pub fn is_satisfied(&self) -> bool {
        !self.series_miss && !self.episode_miss
    }
}

/// Cache walker over a [`RecordStore`].
#[derive(Clone)]
pub struct CacheLookup {
    store: Arc<dyn RecordStore>,
}

impl CacheLookup {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Look a show up by free-text name.
    ///
    /// A fuzzy-name hit whose series row is gone counts as a series miss so
    /// the caller can refetch.
    pub async fn lookup(&self, show: &str, selector: Option<&EpisodeSelector>) -> LookupResult {
        let entry = match self.store.find_fuzzy_name(show).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(show = %show, "No fuzzy name entry");
                return LookupResult::series_miss();
            }
            Err(e) => {
                warn!(show = %show, error = %e, "Fuzzy name lookup failed");
                return LookupResult::series_miss();
            }
        };

        self.lookup_series(&entry.series_id, selector).await
    }

    /// Look a series up by id, skipping the fuzzy-name index.
    pub async fn lookup_series(
        &self,
        series_id: &str,
        selector: Option<&EpisodeSelector>,
    ) -> LookupResult {
        let series = match self.store.find_series(series_id).await {
            Ok(Some(series)) => series,
            Ok(None) => {
                debug!(series_id = %series_id, "Series not cached");
                return LookupResult::series_miss();
            }
            Err(e) => {
                warn!(series_id = %series_id, error = %e, "Series lookup failed");
                return LookupResult::series_miss();
            }
        };

        let Some(selector) = selector else {
            return LookupResult {
                series: Some(series),
                ..Default::default()
            };
        };

        let episode = match self.store.find_episode(series_id, selector).await {
            Ok(episode) => episode,
            Err(e) => {
                warn!(series_id = %series_id, %selector, error = %e, "Episode lookup failed");
                None
            }
        };

        if episode.is_none() {
            debug!(series_id = %series_id, %selector, "Episode not cached");
        }

        LookupResult {
            series: Some(series),
            episode_miss: episode.is_none(),
            episode,
            series_miss: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::store::SqliteRecordStore;
    use showforged_db::models::FuzzyNameEntry;
    use showforged_db::pool::init_memory_pool;

    async fn seeded() -> (CacheLookup, Arc<SqliteRecordStore>) {
        let store = Arc::new(SqliteRecordStore::new(init_memory_pool().unwrap()));
        store
            .save_fuzzy_name(&FuzzyNameEntry::new("Sample Show", "42"))
            .await
            .unwrap();
        store
            .save_series(&SeriesRecord {
                series_id: "42".into(),
                name: Some("Sample Show".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .save_episodes(&[EpisodeRecord {
                episode_id: "1001".into(),
                series_id: "42".into(),
                season_number: Some(1),
                episode_number: Some(1),
                episode_name: Some("Pilot".into()),
                ..Default::default()
            }])
            .await
            .unwrap();
        (CacheLookup::new(store.clone()), store)
    }

    #[tokio::test]
    async fn unknown_show_is_a_series_miss() {
        let (lookup, _) = seeded().await;
        let result = lookup.lookup("Unknown Show", None).await;
        assert!(result.series_miss);
        assert!(result.series.is_none());
        assert!(!result.is_satisfied());
    }

    #[tokio::test]
    async fn series_only_request_is_satisfied() {
        let (lookup, _) = seeded().await;
        let result = lookup.lookup("sample show", None).await;
        assert!(result.is_satisfied());
        assert_eq!(result.series.unwrap().series_id, "42");
        assert!(result.episode.is_none());
    }

    #[tokio::test]
    async fn episode_found_by_numbers() {
        let (lookup, _) = seeded().await;
        let selector = EpisodeSelector::Numbers {
            season: 1,
            episode: 1,
        };
        let result = lookup.lookup("Sample Show", Some(&selector)).await;
        assert!(result.is_satisfied());
        assert_eq!(result.episode.unwrap().episode_id, "1001");
    }

    #[tokio::test]
    async fn missing_episode_keeps_series() {
        let (lookup, _) = seeded().await;
        let selector = EpisodeSelector::Title("Finale".into());
        let result = lookup.lookup("Sample Show", Some(&selector)).await;
        assert!(!result.series_miss);
        assert!(result.episode_miss);
        assert!(result.series.is_some());
    }

    #[tokio::test]
    async fn stale_fuzzy_entry_is_a_series_miss() {
        let (lookup, store) = seeded().await;
        store
            .save_fuzzy_name(&FuzzyNameEntry::new("Ghost Show", "404"))
            .await
            .unwrap();

        let result = lookup.lookup("Ghost Show", None).await;
        assert!(result.series_miss);
    }
}
