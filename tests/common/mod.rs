//! Shared test harness for integration tests.
//!
//! Provides [`StubSource`], a scripted [`SeriesSource`] that counts calls,
//! and [`TestHarness`], which wires it to an in-memory cache and a real
//! package parser.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use showforged::metadata::{ResolveEngine, SeriesSource, SqliteRecordStore, TvdbPackageParser};
use showforged_db::pool::init_memory_pool;

pub const SAMPLE_SERIES_ID: &str = "42";

/// TheTVDB-style document for "Sample Show" with two episodes.
pub fn sample_package_xml() -> String {
    package_xml("42", "Sample Show")
}

/// Package document for an arbitrary series, with the same two episodes.
pub fn package_xml(series_id: &str, name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <Series>
    <id>{series_id}</id>
    <Actors>|Jane Doe|John Roe|</Actors>
    <FirstAired>2008-01-20</FirstAired>
    <Genre>|Drama|Crime|</Genre>
    <IMDB_ID>tt0000{series_id}</IMDB_ID>
    <Language>en</Language>
    <Overview>Series overview.</Overview>
    <Rating>8.5</Rating>
    <SeriesName>{name}</SeriesName>
    <Status>Continuing</Status>
    <poster>posters/{series_id}-1.jpg</poster>
    <zap2it_id>SH00{series_id}</zap2it_id>
  </Series>
  <Episode>
    <id>1001</id>
    <Director>|Ann Director|</Director>
    <EpisodeName>Pilot</EpisodeName>
    <EpisodeNumber>1</EpisodeNumber>
    <FirstAired>2008-01-20</FirstAired>
    <GuestStars>|Guest One|</GuestStars>
    <IMDB_ID>tt1000001</IMDB_ID>
    <Overview>Pilot overview.</Overview>
    <SeasonNumber>1</SeasonNumber>
    <filename>episodes/{series_id}/1001.jpg</filename>
    <seriesid>{series_id}</seriesid>
  </Episode>
  <Episode>
    <id>1002</id>
    <EpisodeName>Second</EpisodeName>
    <EpisodeNumber>2</EpisodeNumber>
    <FirstAired>2008-01-27</FirstAired>
    <SeasonNumber>1</SeasonNumber>
    <seriesid>{series_id}</seriesid>
  </Episode>
</Data>"#
    )
}

/// Zip a document the way TheTVDB packages it.
pub fn zip_package(language: &str, xml: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(
            format!("{language}.xml"),
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Scripted remote source.
pub struct StubSource {
    pub series_id: Mutex<Option<String>>,
    pub xml: Mutex<String>,
    pub delay: Duration,
    pub fail: AtomicBool,
    pub searches: AtomicUsize,
    pub downloads: AtomicUsize,
    pub searched_names: Mutex<Vec<String>>,
    pub languages: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(0))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            series_id: Mutex::new(Some(SAMPLE_SERIES_ID.to_string())),
            xml: Mutex::new(sample_package_xml()),
            delay,
            fail: AtomicBool::new(false),
            searches: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            searched_names: Mutex::new(Vec::new()),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_package(&self, series_id: Option<&str>, xml: String) {
        *self.series_id.lock().unwrap() = series_id.map(str::to_string);
        *self.xml.lock().unwrap() = xml;
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn remote_calls(&self) -> usize {
        self.searches() + self.downloads()
    }
}

#[async_trait]
impl SeriesSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search_series(&self, name: &str) -> anyhow::Result<Option<String>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.searched_names.lock().unwrap().push(name.to_string());
        tokio::time::sleep(self.delay).await;
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("search endpoint unreachable");
        }
        Ok(self.series_id.lock().unwrap().clone())
    }

    async fn fetch_series_package(&self, _series_id: &str, language: &str) -> anyhow::Result<Bytes> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language.to_string());
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("package download failed");
        }
        let xml = self.xml.lock().unwrap().clone();
        Ok(Bytes::from(zip_package(language, &xml)))
    }
}

/// Engine wired to a [`StubSource`] and an in-memory cache.
pub struct TestHarness {
    pub store: Arc<SqliteRecordStore>,
    pub source: Arc<StubSource>,
    pub engine: Arc<ResolveEngine>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_source(StubSource::new())
    }

    pub fn with_source(source: StubSource) -> Self {
        let store = Arc::new(SqliteRecordStore::new(
            init_memory_pool().expect("failed to create in-memory pool"),
        ));
        let source = Arc::new(source);
        let engine = Arc::new(ResolveEngine::with_languages(
            store.clone(),
            source.clone(),
            Arc::new(TvdbPackageParser::default()),
            vec!["en".to_string()],
        ));

        Self {
            store,
            source,
            engine,
        }
    }
}
