//! Trait definitions for the remote side of metadata resolution.
//!
//! A [`SeriesSource`] talks to the metadata service; a [`DocumentParser`]
//! turns the package it downloads into cache records. Both are injected into
//! the [`FetchCoordinator`](super::coordinator::FetchCoordinator) so tests can
//! swap in stubs.

use async_trait::async_trait;
use bytes::Bytes;
use showforged_db::models::{EpisodeRecord, SeriesRecord};

use super::package::PackageError;
use showforged_common::EpisodeSelector;

/// Everything one series package yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPackage {
    pub series: SeriesRecord,
    pub episodes: Vec<EpisodeRecord>,
}

impl SeriesPackage {
    /// The first episode the selector names, if the package contains it.
    pub fn find_episode(&self, selector: &EpisodeSelector) -> Option<&EpisodeRecord> {
        self.episodes.iter().find(|e| e.is_selected_by(selector))
    }
}

/// Remote metadata service offering name search and bulk series downloads.
///
/// Implementations own their transport concerns: timeouts, throttling, and
/// retries all happen below this trait.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"thetvdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the source is configured and may issue requests.
    fn is_available(&self) -> bool;

    /// Find the canonical series id for a free-text show name.
    ///
    /// `Ok(None)` means the service answered but knows no such show.
    async fn search_series(&self, name: &str) -> anyhow::Result<Option<String>>;

    /// Download the full package (series plus all episodes) for a series.
    async fn fetch_series_package(&self, series_id: &str, language: &str)
        -> anyhow::Result<Bytes>;
}

/// Turns a downloaded package into records.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, document: &[u8], language: &str) -> Result<SeriesPackage, PackageError>;
}
