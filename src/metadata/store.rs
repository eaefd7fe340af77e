//! Async access to the metadata cache.
//!
//! [`RecordStore`] is the seam between resolution logic and persistence.
//! [`SqliteRecordStore`] implements it on top of the r2d2 pool, running each
//! query on tokio's blocking pool so async callers never block a worker.

use async_trait::async_trait;
use rusqlite::Connection;
use showforged_common::{EpisodeSelector, Error, Result};
use showforged_db::models::{EpisodeRecord, FuzzyNameEntry, SeriesRecord};
use showforged_db::pool::{get_conn, DbPool};
use showforged_db::queries::{episodes, fuzzy_names, series};

/// Keyed persistence for fuzzy names, series, and episodes.
///
/// Finds return `Ok(None)` when nothing matches; `Err` is reserved for
/// storage failures. Saves are upserts keyed by the record's unique id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_fuzzy_name(&self, name: &str) -> Result<Option<FuzzyNameEntry>>;

    async fn find_series(&self, series_id: &str) -> Result<Option<SeriesRecord>>;

    async fn find_episode(
        &self,
        series_id: &str,
        selector: &EpisodeSelector,
    ) -> Result<Option<EpisodeRecord>>;

    /// Every fuzzy name that points at a series.
    async fn fuzzy_names_for_series(&self, series_id: &str) -> Result<Vec<FuzzyNameEntry>>;

    async fn save_fuzzy_name(&self, entry: &FuzzyNameEntry) -> Result<()>;

    async fn save_series(&self, series: &SeriesRecord) -> Result<()>;

    /// Save a batch of episodes atomically, returning how many were written.
    async fn save_episodes(&self, episodes: &[EpisodeRecord]) -> Result<usize>;
}

/// [`RecordStore`] backed by the SQLite cache.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: DbPool,
}

impl SqliteRecordStore {
    /// Wrap an initialized (already migrated) pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::internal(format!("database task failed: {e}")))?
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_fuzzy_name(&self, name: &str) -> Result<Option<FuzzyNameEntry>> {
        let name = name.to_string();
        self.with_conn(move |conn| fuzzy_names::find_fuzzy_name(conn, &name))
            .await
    }

    async fn find_series(&self, series_id: &str) -> Result<Option<SeriesRecord>> {
        let series_id = series_id.to_string();
        self.with_conn(move |conn| series::get_series(conn, &series_id))
            .await
    }

    async fn find_episode(
        &self,
        series_id: &str,
        selector: &EpisodeSelector,
    ) -> Result<Option<EpisodeRecord>> {
        let series_id = series_id.to_string();
        let selector = selector.clone();
        self.with_conn(move |conn| episodes::find_episode(conn, &series_id, &selector))
            .await
    }

    async fn fuzzy_names_for_series(&self, series_id: &str) -> Result<Vec<FuzzyNameEntry>> {
        let series_id = series_id.to_string();
        self.with_conn(move |conn| fuzzy_names::list_for_series(conn, &series_id))
            .await
    }

    async fn save_fuzzy_name(&self, entry: &FuzzyNameEntry) -> Result<()> {
        let entry = entry.clone();
        self.with_conn(move |conn| fuzzy_names::upsert_fuzzy_name(conn, &entry))
            .await
    }

    async fn save_series(&self, record: &SeriesRecord) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| series::upsert_series(conn, &record))
            .await
    }

    async fn save_episodes(&self, records: &[EpisodeRecord]) -> Result<usize> {
        let records = records.to_vec();
        self.with_conn(move |conn| episodes::upsert_episodes(conn, &records))
            .await
    }
}
