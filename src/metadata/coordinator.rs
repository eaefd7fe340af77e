//! Coalesced remote fetches.
//!
//! The [`FetchCoordinator`] owns a wait-list keyed by what is being fetched.
//! The first request for a key starts a background fetch; later requests for
//! the same key queue behind it instead of issuing their own. When the fetch
//! finishes, the results are persisted, the wait-list entry is removed, and
//! every queued request is answered in the order it arrived.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::FutureExt;
use showforged_db::models::FuzzyNameEntry;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::error::ResolveError;
use super::provider::{DocumentParser, SeriesPackage, SeriesSource};
use super::store::RecordStore;

/// Outcome of one fetch, shared by every request that waited on it.
pub type FetchResult = Result<Arc<SeriesPackage>, ResolveError>;

/// What a fetch is keyed by.
///
/// A name and an id for the same series are distinct keys, so concurrent
/// requests arriving by both routes download the package twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchTarget {
    /// A free-text show name; the fetch starts with a remote search.
    Show(String),
    /// A known series id; the search step is skipped.
    Series(String),
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Show(name) => write!(f, "show {name:?}"),
            FetchTarget::Series(id) => write!(f, "series {id}"),
        }
    }
}

type Waiter = oneshot::Sender<FetchResult>;

struct Inner {
    source: Arc<dyn SeriesSource>,
    parser: Arc<dyn DocumentParser>,
    store: Arc<dyn RecordStore>,
    wait_list: DashMap<FetchTarget, Vec<Waiter>>,
}

/// Starts remote fetches and fans their results out to every waiter.
///
/// Cloning is cheap; clones share the same wait-list.
#[derive(Clone)]
pub struct FetchCoordinator {
    inner: Arc<Inner>,
}

impl FetchCoordinator {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        parser: Arc<dyn DocumentParser>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                parser,
                store,
                wait_list: DashMap::new(),
            }),
        }
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.wait_list.len()
    }

    /// Wait for `target` to be fetched, starting the fetch if none is running.
    ///
    /// The language of the request that started the fetch is the one used;
    /// requests that join an in-flight fetch get its result regardless of
    /// their own preference.
    pub async fn ensure_fetched(&self, target: FetchTarget, language: &str) -> FetchResult {
        let (tx, rx) = oneshot::channel();

        let start = match self.inner.wait_list.entry(target.clone()) {
            Entry::Occupied(mut queued) => {
                queued.get_mut().push(tx);
                debug!(key = %target, waiters = queued.get().len(), "Joining in-flight fetch");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![tx]);
                true
            }
        };

        if start {
            info!(key = %target, language = %language, "Starting remote fetch");
            let inner = Arc::clone(&self.inner);
            let language = language.to_string();
            tokio::spawn(async move {
                inner.run(target, language).await;
            });
        }

        rx.await.unwrap_or_else(|_| {
            Err(ResolveError::RemoteUnavailable(
                "fetch ended without a result".into(),
            ))
        })
    }
}

impl Inner {
    async fn run(&self, target: FetchTarget, language: String) {
        // Waiters must be drained even if the fetch panics.
        let result = AssertUnwindSafe(self.fetch(&target, &language))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(ResolveError::RemoteUnavailable(
                    "fetch task panicked".into(),
                ))
            });

        // Detach the queue first: a waiter that resolves the same key again
        // must start a new fetch, not join this one.
        let waiters = self
            .wait_list
            .remove(&target)
            .map(|(_, waiters)| waiters)
            .unwrap_or_default();

        match &result {
            Ok(package) => info!(
                key = %target,
                series_id = %package.series.series_id,
                episodes = package.episodes.len(),
                waiters = waiters.len(),
                "Remote fetch complete"
            ),
            Err(e) => warn!(
                key = %target,
                error = %e,
                waiters = waiters.len(),
                "Remote fetch failed"
            ),
        }

        for waiter in waiters {
            // A dropped receiver means that caller went away.
            let _ = waiter.send(result.clone());
        }
    }

    async fn fetch(&self, target: &FetchTarget, language: &str) -> FetchResult {
        if !self.source.is_available() {
            return Err(ResolveError::RemoteUnavailable(format!(
                "{} source is not configured",
                self.source.name()
            )));
        }

        let series_id = match target {
            FetchTarget::Show(name) => self
                .source
                .search_series(name)
                .await
                .map_err(|e| ResolveError::RemoteUnavailable(format!("{e:#}")))?
                .ok_or_else(|| ResolveError::ShowNotFound(name.clone()))?,
            FetchTarget::Series(id) => id.clone(),
        };

        debug!(key = %target, series_id = %series_id, "Downloading series package");

        let document = self
            .source
            .fetch_series_package(&series_id, language)
            .await
            .map_err(|e| ResolveError::RemoteUnavailable(format!("{e:#}")))?;

        let package = self
            .parser
            .parse(&document, language)
            .map_err(|e| ResolveError::MalformedRemoteData(e.to_string()))?;

        self.persist(target, &package).await;

        Ok(Arc::new(package))
    }

    /// Write a fetched package to the cache. Failures are logged only; the
    /// waiters are served from the in-memory package either way.
    async fn persist(&self, target: &FetchTarget, package: &SeriesPackage) {
        let series = &package.series;
        let series_id = series.series_id.as_str();

        let series_saved = match self.store.save_series(series).await {
            Ok(()) => true,
            Err(e) => {
                warn!(series_id = %series_id, error = %e, "Failed to cache series");
                false
            }
        };

        if let Err(e) = self.store.save_episodes(&package.episodes).await {
            warn!(
                series_id = %series_id,
                episodes = package.episodes.len(),
                error = %e,
                "Failed to cache episodes"
            );
        }

        let canonical = series.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

        if series_saved {
            if let Some(name) = canonical {
                self.save_fuzzy_name(name, series_id).await;
            }
        }

        if let FetchTarget::Show(requested) = target {
            let same_as_canonical =
                canonical.is_some_and(|name| name.eq_ignore_ascii_case(requested.trim()));
            if !same_as_canonical {
                self.save_fuzzy_name(requested, series_id).await;
            }
        }
    }

    async fn save_fuzzy_name(&self, name: &str, series_id: &str) {
        if let Err(e) = self
            .store
            .save_fuzzy_name(&FuzzyNameEntry::new(name, series_id))
            .await
        {
            warn!(fuzzy_name = %name, series_id = %series_id, error = %e, "Failed to cache fuzzy name");
        }
    }
}
