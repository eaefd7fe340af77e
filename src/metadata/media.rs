//! The media record callers ask to have filled in, and the rules for merging
//! cached series/episode data into it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use showforged_common::{split_delimited, EpisodeSelector};
use showforged_db::models::{EpisodeRecord, SeriesRecord};

// ---------------------------------------------------------------------------
// Field keys
// ---------------------------------------------------------------------------

/// A metadata field a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKey {
    Show,
    Season,
    Episode,
    EpisodeTitle,
    Genre,
    Performer,
    Director,
    GuestStars,
    PublicationDate,
    Description,
    ThetvdbId,
    ImdbId,
    Zap2itId,
    Fanart,
    Banner,
    Poster,
    EpisodeScreenshot,
    Rating,
}

impl FieldKey {
    /// Every key the resolver supports.
    pub const ALL: &'static [FieldKey] = &[
        FieldKey::Show,
        FieldKey::Season,
        FieldKey::Episode,
        FieldKey::EpisodeTitle,
        FieldKey::Genre,
        FieldKey::Performer,
        FieldKey::Director,
        FieldKey::GuestStars,
        FieldKey::PublicationDate,
        FieldKey::Description,
        FieldKey::ThetvdbId,
        FieldKey::ImdbId,
        FieldKey::Zap2itId,
        FieldKey::Fanart,
        FieldKey::Banner,
        FieldKey::Poster,
        FieldKey::EpisodeScreenshot,
        FieldKey::Rating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Show => "show",
            FieldKey::Season => "season",
            FieldKey::Episode => "episode",
            FieldKey::EpisodeTitle => "episode-title",
            FieldKey::Genre => "genre",
            FieldKey::Performer => "performer",
            FieldKey::Director => "director",
            FieldKey::GuestStars => "guest-stars",
            FieldKey::PublicationDate => "publication-date",
            FieldKey::Description => "description",
            FieldKey::ThetvdbId => "thetvdb-id",
            FieldKey::ImdbId => "imdb-id",
            FieldKey::Zap2itId => "zap2it-id",
            FieldKey::Fanart => "fanart",
            FieldKey::Banner => "banner",
            FieldKey::Poster => "poster",
            FieldKey::EpisodeScreenshot => "episode-screenshot",
            FieldKey::Rating => "rating",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        FieldKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown field key: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// A TV episode (or show) whose metadata is being resolved.
///
/// `show`, `series_id`, `season`, `episode` and `episode_title` double as
/// lookup hints; everything else is output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    /// TheTVDB series id, set once a series has been resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
    /// Episode id when an episode was resolved, otherwise the series id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thetvdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zap2it_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guest_stars: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_screenshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl Media {
    /// A media record for a show, identified by name only.
    pub fn show(name: impl Into<String>) -> Self {
        Self {
            show: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_season_episode(mut self, season: u32, episode: u32) -> Self {
        self.season = Some(season);
        self.episode = Some(episode);
        self
    }

    pub fn with_episode_title(mut self, title: impl Into<String>) -> Self {
        self.episode_title = Some(title.into());
        self
    }

    /// The non-blank show name, if any.
    pub fn show_name(&self) -> Option<&str> {
        non_blank(self.show.as_deref())
    }

    /// The non-blank series id, if any.
    pub fn known_series_id(&self) -> Option<&str> {
        non_blank(self.series_id.as_deref())
    }

    /// The episode the hints identify, if any.
    pub fn episode_selector(&self) -> Option<EpisodeSelector> {
        EpisodeSelector::from_parts(self.season, self.episode, self.episode_title.as_deref())
    }

    fn has_episode_title(&self) -> bool {
        non_blank(self.episode_title.as_deref()).is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// Check whether `key` can be resolved for `media`.
///
/// On failure, returns the input fields the media would need first.
pub fn may_resolve(media: &Media, key: FieldKey) -> Result<(), Vec<FieldKey>> {
    let mut missing = Vec::new();

    if media.show_name().is_none() && media.known_series_id().is_none() {
        missing.push(FieldKey::Show);
    }

    let need_numbers = |missing: &mut Vec<FieldKey>| {
        if media.season.is_none() {
            missing.push(FieldKey::Season);
        }
        if media.episode.is_none() {
            missing.push(FieldKey::Episode);
        }
    };

    match key {
        FieldKey::Season | FieldKey::Episode => {
            if !media.has_episode_title() {
                missing.push(FieldKey::EpisodeTitle);
            }
        }
        FieldKey::EpisodeTitle => need_numbers(&mut missing),
        FieldKey::Director | FieldKey::GuestStars | FieldKey::EpisodeScreenshot => {
            if !media.has_episode_title() {
                need_numbers(&mut missing);
            }
        }
        _ => {}
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Copy every requested field that the records can answer into `media`.
///
/// Episode values win over series values for fields both carry. The show
/// name and series id are set whenever a series is known, requested or not.
/// Fields that cannot be answered are left as they were.
pub fn merge_fields(
    media: &mut Media,
    keys: &[FieldKey],
    series: Option<&SeriesRecord>,
    episode: Option<&EpisodeRecord>,
) {
    if let Some(series) = series {
        media.series_id = Some(series.series_id.clone());
        if let Some(name) = &series.name {
            media.show = Some(name.clone());
        }
    }

    for key in keys {
        match key {
            FieldKey::Show => {}
            FieldKey::Season => {
                if let Some(season) = episode.and_then(|e| e.season_number).filter(|n| *n > 0) {
                    media.season = Some(season);
                }
            }
            FieldKey::Episode => {
                if let Some(number) = episode.and_then(|e| e.episode_number).filter(|n| *n > 0) {
                    media.episode = Some(number);
                }
            }
            FieldKey::EpisodeTitle => {
                set_if_some(&mut media.episode_title, episode.and_then(|e| e.episode_name.as_ref()))
            }
            FieldKey::Director => add_list(
                &mut media.directors,
                episode.and_then(|e| e.director_names.as_deref()),
            ),
            FieldKey::GuestStars => add_list(
                &mut media.guest_stars,
                episode.and_then(|e| e.guest_star_names.as_deref()),
            ),
            FieldKey::EpisodeScreenshot => set_if_some(
                &mut media.episode_screenshot,
                episode.and_then(|e| e.screenshot_url.as_ref()),
            ),
            FieldKey::Genre => {
                add_list(&mut media.genres, series.and_then(|s| s.genres.as_deref()))
            }
            FieldKey::Performer => add_list(
                &mut media.performers,
                series.and_then(|s| s.actor_names.as_deref()),
            ),
            FieldKey::Zap2itId => {
                set_if_some(&mut media.zap2it_id, series.and_then(|s| s.zap2it_id.as_ref()))
            }
            FieldKey::Fanart => {
                set_if_some(&mut media.fanart, series.and_then(|s| s.fanart_url.as_ref()))
            }
            FieldKey::Banner => {
                set_if_some(&mut media.banner, series.and_then(|s| s.banner_url.as_ref()))
            }
            FieldKey::Poster => {
                set_if_some(&mut media.poster, series.and_then(|s| s.poster_url.as_ref()))
            }
            FieldKey::PublicationDate => {
                let date = [
                    episode.and_then(|e| e.first_aired.as_deref()),
                    series.and_then(|s| s.first_aired.as_deref()),
                ]
                .into_iter()
                .flatten()
                .find_map(parse_air_date);
                if let Some(date) = date {
                    media.publication_date = Some(date);
                }
            }
            FieldKey::Description => set_if_some(
                &mut media.description,
                episode
                    .and_then(|e| e.overview.as_ref())
                    .or_else(|| series.and_then(|s| s.overview.as_ref())),
            ),
            FieldKey::ThetvdbId => set_if_some(
                &mut media.thetvdb_id,
                episode
                    .map(|e| &e.episode_id)
                    .or_else(|| series.map(|s| &s.series_id)),
            ),
            FieldKey::ImdbId => set_if_some(
                &mut media.imdb_id,
                episode
                    .and_then(|e| e.imdb_id.as_ref())
                    .or_else(|| series.and_then(|s| s.imdb_id.as_ref())),
            ),
            FieldKey::Rating => {
                if let Some(rating) = episode
                    .and_then(|e| e.rating)
                    .or_else(|| series.and_then(|s| s.rating))
                {
                    media.rating = Some(rating);
                }
            }
        }
    }
}

fn set_if_some(target: &mut Option<String>, value: Option<&String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

/// Append the items of a delimited list that are not already present.
fn add_list(target: &mut Vec<String>, value: Option<&str>) {
    for item in value.map(split_delimited).unwrap_or_default() {
        if !target.iter().any(|existing| existing == item) {
            target.push(item.to_string());
        }
    }
}

fn parse_air_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
