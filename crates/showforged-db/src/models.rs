//! Database models.
//!
//! Rust structs mirroring the cache tables. List-valued fields keep TheTVDB's
//! `|`-delimited form; use [`showforged_common::split_delimited`] to expand them.

use serde::{Deserialize, Serialize};
use showforged_common::EpisodeSelector;

/// A free-text show name mapped to a canonical series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyNameEntry {
    pub fuzzy_name: String,
    pub series_id: String,
}

impl FuzzyNameEntry {
    pub fn new(fuzzy_name: impl Into<String>, series_id: impl Into<String>) -> Self {
        Self {
            fuzzy_name: fuzzy_name.into(),
            series_id: series_id.into(),
        }
    }
}

/// Series-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub series_id: String,
    pub name: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub overview: Option<String>,
    pub first_aired: Option<String>,
    pub imdb_id: Option<String>,
    pub zap2it_id: Option<String>,
    pub rating: Option<f64>,
    pub genres: Option<String>,
    pub actor_names: Option<String>,
    pub banner_url: Option<String>,
    pub poster_url: Option<String>,
    pub fanart_url: Option<String>,
}

/// Episode-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode_id: String,
    pub series_id: String,
    pub season_id: Option<String>,
    pub language: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub absolute_number: Option<u32>,
    pub episode_name: Option<String>,
    pub overview: Option<String>,
    pub first_aired: Option<String>,
    pub imdb_id: Option<String>,
    pub director_names: Option<String>,
    pub guest_star_names: Option<String>,
    pub screenshot_url: Option<String>,
    pub rating: Option<f64>,
}

impl EpisodeRecord {
    /// Whether this episode is the one the selector names.
    pub fn is_selected_by(&self, selector: &EpisodeSelector) -> bool {
        selector.matches(
            self.season_number,
            self.episode_number,
            self.episode_name.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_selected_by_title() {
        let episode = EpisodeRecord {
            episode_id: "1001".into(),
            series_id: "42".into(),
            season_number: Some(1),
            episode_number: Some(1),
            episode_name: Some("Pilot".into()),
            ..Default::default()
        };

        assert!(episode.is_selected_by(&EpisodeSelector::Title("pilot".into())));
        assert!(episode.is_selected_by(&EpisodeSelector::Numbers {
            season: 1,
            episode: 1
        }));
        assert!(!episode.is_selected_by(&EpisodeSelector::Numbers {
            season: 1,
            episode: 2
        }));
    }
}
