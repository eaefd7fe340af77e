//! Public entry point for metadata resolution.
//!
//! A resolve goes through the cache first. On a miss it either settles for
//! whatever the cache had (`cache_only`) or waits on a coalesced remote fetch
//! and then reads the freshly written records. Requested fields are merged
//! into the caller's [`Media`] at the end of every path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::coordinator::{FetchCoordinator, FetchTarget};
use super::error::ResolveError;
use super::language::{preferred_language, system_language_names};
use super::lookup::{CacheLookup, LookupResult};
use super::media::{merge_fields, FieldKey, Media};
use super::provider::{DocumentParser, SeriesSource};
use super::store::RecordStore;

/// Per-call options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Preferred language tag; overrides the engine's configured list.
    pub language: Option<String>,
    /// Forbid network access; only cached data is used.
    pub cache_only: bool,
}

impl ResolveOptions {
    pub fn cache_only() -> Self {
        Self {
            cache_only: true,
            ..Default::default()
        }
    }
}

/// Which path a resolve took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolveOutcome {
    /// Everything needed was already cached.
    Cached,
    /// Data was missing and the network was off-limits; cached data, if
    /// any, was merged.
    CacheOnly,
    /// A remote fetch completed and its data was merged.
    Fetched,
    /// A remote fetch failed; cached data, if any, was merged.
    FetchFailed,
}

/// Resolves TV metadata into [`Media`] records.
pub struct ResolveEngine {
    lookup: CacheLookup,
    coordinator: FetchCoordinator,
    languages: Vec<String>,
}

impl ResolveEngine {
    /// Build an engine whose language preference comes from the process
    /// locale.
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn SeriesSource>,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        Self::with_languages(store, source, parser, system_language_names())
    }

    /// Build an engine with an explicit language preference list.
    pub fn with_languages(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn SeriesSource>,
        parser: Arc<dyn DocumentParser>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            lookup: CacheLookup::new(Arc::clone(&store)),
            coordinator: FetchCoordinator::new(source, parser, store),
            languages,
        }
    }

    pub fn coordinator(&self) -> &FetchCoordinator {
        &self.coordinator
    }

    /// The language a fetch for these options would use.
    pub fn language_for(&self, options: &ResolveOptions) -> &'static str {
        preferred_language(options.language.iter().chain(self.languages.iter()))
    }

    /// Fill the requested fields of `media`.
    ///
    /// Only a media record with neither a show name nor a series id is an
    /// error; it is returned untouched. Every other path, including remote
    /// failures, merges whatever could be found and returns the path taken.
    pub async fn resolve(
        &self,
        media: &mut Media,
        keys: &[FieldKey],
        options: &ResolveOptions,
    ) -> Result<ResolveOutcome, ResolveError> {
        let target = match (media.known_series_id(), media.show_name()) {
            (Some(id), _) => FetchTarget::Series(id.to_string()),
            (None, Some(show)) => FetchTarget::Show(show.to_string()),
            (None, None) => return Err(ResolveError::MissingShow),
        };

        let selector = media.episode_selector();
        let selector = selector.as_ref();

        let cached = match &target {
            FetchTarget::Series(id) => self.lookup.lookup_series(id, selector).await,
            FetchTarget::Show(show) => self.lookup.lookup(show, selector).await,
        };

        if cached.is_satisfied() {
            debug!(key = %target, "Resolved from cache");
            merge(media, keys, &cached);
            return Ok(ResolveOutcome::Cached);
        }

        if options.cache_only {
            debug!(key = %target, "Cache miss with network disabled");
            merge(media, keys, &cached);
            return Ok(ResolveOutcome::CacheOnly);
        }

        let language = self.language_for(options);
        match self.coordinator.ensure_fetched(target.clone(), language).await {
            Ok(package) => {
                let series_id = package.series.series_id.clone();
                let mut fresh = self.lookup.lookup_series(&series_id, selector).await;

                // Persistence may have failed; the fetched package still answers.
                if fresh.series.is_none() {
                    fresh.series = Some(package.series.clone());
                    fresh.series_miss = false;
                }
                if fresh.episode.is_none() {
                    if let Some(episode) = selector.and_then(|s| package.find_episode(s)) {
                        fresh.episode = Some(episode.clone());
                        fresh.episode_miss = false;
                    }
                }

                info!(
                    key = %target,
                    series_id = %series_id,
                    episode_found = fresh.episode.is_some(),
                    "Resolved from remote fetch"
                );
                merge(media, keys, &fresh);
                Ok(ResolveOutcome::Fetched)
            }
            Err(e) => {
                info!(key = %target, error = %e, "Falling back to cached data");
                merge(media, keys, &cached);
                Ok(ResolveOutcome::FetchFailed)
            }
        }
    }

    /// Resolve in the background and hand the result to `callback`.
    ///
    /// The callback runs exactly once, with the (possibly partially) filled
    /// media and the error, if the media could not be resolved at all.
    pub fn resolve_with<F>(
        self: &Arc<Self>,
        mut media: Media,
        keys: Vec<FieldKey>,
        options: ResolveOptions,
        callback: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Media, Option<ResolveError>) + Send + 'static,
    {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let error = engine.resolve(&mut media, &keys, &options).await.err();
            callback(media, error);
        })
    }
}

fn merge(media: &mut Media, keys: &[FieldKey], result: &LookupResult) {
    merge_fields(media, keys, result.series.as_ref(), result.episode.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::package::TvdbPackageParser;
    use crate::metadata::providers::ThetvdbClient;
    use crate::metadata::store::SqliteRecordStore;
    use crate::config::TheTvdbConfig;
    use showforged_db::pool::init_memory_pool;

    fn engine(languages: &[&str]) -> ResolveEngine {
        let store = Arc::new(SqliteRecordStore::new(init_memory_pool().unwrap()));
        let client = ThetvdbClient::new(&TheTvdbConfig::default()).unwrap();
        ResolveEngine::with_languages(
            store,
            Arc::new(client),
            Arc::new(TvdbPackageParser::default()),
            languages.iter().map(|l| l.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn language_option_overrides_configured_list() {
        let engine = engine(&["de", "en"]);
        assert_eq!(engine.language_for(&ResolveOptions::default()), "de");

        let options = ResolveOptions {
            language: Some("fr".into()),
            cache_only: false,
        };
        assert_eq!(engine.language_for(&options), "fr");

        let unsupported = ResolveOptions {
            language: Some("tlh".into()),
            cache_only: false,
        };
        assert_eq!(engine.language_for(&unsupported), "de");
    }

    #[tokio::test]
    async fn missing_show_leaves_media_untouched() {
        let engine = engine(&[]);
        let mut media = Media::default().with_season_episode(1, 1);
        let before = media.clone();

        let result = engine
            .resolve(&mut media, &[FieldKey::Description], &ResolveOptions::default())
            .await;

        assert_eq!(result, Err(ResolveError::MissingShow));
        assert_eq!(media, before);
    }

    #[tokio::test]
    async fn unconfigured_source_falls_back_to_cache() {
        let engine = engine(&[]);
        let mut media = Media::show("Sample Show");

        let outcome = engine
            .resolve(&mut media, &[FieldKey::Genre], &ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome, ResolveOutcome::FetchFailed);
        assert_eq!(media, Media::show("Sample Show"));
        assert_eq!(engine.coordinator().in_flight(), 0);
    }
}
