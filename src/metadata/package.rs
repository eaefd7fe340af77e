//! TheTVDB series package parsing.
//!
//! A package is a zip archive holding one XML document per language
//! (`en.xml`, `de.xml`, ...). Each document has a single `<Series>` element
//! followed by one `<Episode>` element per episode; every child element of
//! those is a plain field/value pair.
//!
//! Field names are matched case-insensitively and empty values are dropped.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use showforged_db::models::{EpisodeRecord, SeriesRecord};
use tracing::debug;

use super::provider::{DocumentParser, SeriesPackage};
use super::providers::thetvdb::DEFAULT_BASE_URL;

/// Errors produced while unpacking or reading a series package.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("invalid package archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("package has no {0} document")]
    MissingDocument(String),

    #[error("failed to read package document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("package does not contain a series id")]
    MissingSeriesId,
}

type Fields = HashMap<String, String>;

/// One top-level element of a document: its lowercased tag and fields.
#[derive(Debug)]
struct XmlRecord {
    tag: String,
    fields: Fields,
}

impl XmlRecord {
    fn take(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    fn take_number(&mut self, field: &str) -> Option<u32> {
        self.take(field).and_then(|v| parse_number(&v))
    }

    fn take_rating(&mut self, field: &str) -> Option<f64> {
        self.take(field)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite())
    }
}

/// Walk a `<Data>` document and collect its second-level elements.
fn collect_records(xml: &str) -> Result<Vec<XmlRecord>, PackageError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<XmlRecord> = None;
    let mut field: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                match depth {
                    2 => {
                        current = Some(XmlRecord {
                            tag,
                            fields: Fields::new(),
                        })
                    }
                    3 => field = Some(tag),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    2 => records.extend(current.take()),
                    3 => field = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| PackageError::Xml(e.to_string()))?;
                push_value(current.as_mut(), field.as_deref(), &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_value(current.as_mut(), field.as_deref(), &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PackageError::Xml(format!(
                    "at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    for record in &mut records {
        record.fields.retain(|_, value| !value.trim().is_empty());
    }

    Ok(records)
}

fn push_value(record: Option<&mut XmlRecord>, field: Option<&str>, text: &str) {
    if let (Some(record), Some(field)) = (record, field) {
        record
            .fields
            .entry(field.to_string())
            .or_default()
            .push_str(text);
    }
}

/// Parse counters like `"3"` and the occasional `"3.0"`.
fn parse_number(value: &str) -> Option<u32> {
    let value = value.trim();
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
            .map(|n| n as u32)
    })
}

/// Extract the series id from a `GetSeries.php` search response.
///
/// The first `<Series>` result wins. Its `<id>` is preferred; older responses
/// only carry `<seriesid>`.
pub fn parse_search_response(xml: &str) -> Result<Option<String>, PackageError> {
    let id = collect_records(xml)?
        .into_iter()
        .find(|record| record.tag == "series")
        .and_then(|mut record| record.take("id").or_else(|| record.take("seriesid")))
        .map(|id| id.trim().to_string());

    Ok(id)
}

/// Parser for TheTVDB zip packages.
#[derive(Debug, Clone)]
pub struct TvdbPackageParser {
    image_base: String,
}

impl Default for TvdbPackageParser {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TvdbPackageParser {
    /// Create a parser that resolves image paths against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            image_base: format!("{}/banners", base_url.trim_end_matches('/')),
        }
    }

    /// Turn a relative banner path into an absolute URL.
    fn image_url(&self, path: Option<String>) -> Option<String> {
        let path = path?;
        let path = path.trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            Some(path.to_string())
        } else {
            Some(format!("{}/{}", self.image_base, path.trim_start_matches('/')))
        }
    }

    /// Parse one language document of a package.
    pub fn parse_xml(&self, xml: &str) -> Result<SeriesPackage, PackageError> {
        let mut series = None;
        let mut episodes = Vec::new();

        for mut record in collect_records(xml)? {
            match record.tag.as_str() {
                "series" if series.is_none() => series = Some(self.series_from(&mut record)?),
                "episode" => match self.episode_from(&mut record) {
                    Some(episode) => episodes.push(episode),
                    None => debug!("Skipping episode without an id"),
                },
                _ => {}
            }
        }

        let series = series.ok_or(PackageError::MissingSeriesId)?;

        for episode in &mut episodes {
            if episode.series_id.is_empty() {
                episode.series_id = series.series_id.clone();
            }
        }

        if episodes.is_empty() {
            debug!(series_id = %series.series_id, "Series package contains no episodes");
        }

        Ok(SeriesPackage { series, episodes })
    }

    fn series_from(&self, record: &mut XmlRecord) -> Result<SeriesRecord, PackageError> {
        let series_id = record
            .take("id")
            .map(|id| id.trim().to_string())
            .ok_or(PackageError::MissingSeriesId)?;

        Ok(SeriesRecord {
            series_id,
            name: record.take("seriesname"),
            language: record.take("language"),
            status: record.take("status"),
            overview: record.take("overview"),
            first_aired: record.take("firstaired"),
            imdb_id: record.take("imdb_id"),
            zap2it_id: record.take("zap2it_id"),
            rating: record.take_rating("rating"),
            genres: record.take("genre"),
            actor_names: record.take("actors"),
            banner_url: self.image_url(record.take("banner")),
            poster_url: self.image_url(record.take("poster")),
            fanart_url: self.image_url(record.take("fanart")),
        })
    }

    fn episode_from(&self, record: &mut XmlRecord) -> Option<EpisodeRecord> {
        let episode_id = record.take("id")?.trim().to_string();

        Some(EpisodeRecord {
            episode_id,
            series_id: record.take("seriesid").unwrap_or_default(),
            season_id: record.take("seasonid"),
            language: record.take("language"),
            season_number: record.take_number("seasonnumber"),
            episode_number: record.take_number("episodenumber"),
            absolute_number: record.take_number("absolute_number"),
            episode_name: record.take("episodename"),
            overview: record.take("overview"),
            first_aired: record.take("firstaired"),
            imdb_id: record.take("imdb_id"),
            director_names: record.take("director"),
            guest_star_names: record.take("gueststars"),
            screenshot_url: self.image_url(record.take("filename")),
            rating: record.take_rating("rating"),
        })
    }
}

/// Pull `{language}.xml` out of a package archive.
fn read_document(archive: &[u8], language: &str) -> Result<String, PackageError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let name = format!("{language}.xml");

    let mut file = match zip.by_name(&name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(PackageError::MissingDocument(name))
        }
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

impl DocumentParser for TvdbPackageParser {
    fn parse(&self, document: &[u8], language: &str) -> Result<SeriesPackage, PackageError> {
        let xml = read_document(document, language)?;
        self.parse_xml(&xml)
    }
}
