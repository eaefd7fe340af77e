//! Core types shared between the cache and the resolver.

use serde::{Deserialize, Serialize};

/// Separator TheTVDB uses for list-valued fields such as genres and actors.
pub const LIST_DELIMITER: char = '|';

/// Identifies one episode within a series.
///
/// Numeric selectors are only used when both numbers are non-zero; season 0
/// holds specials whose episode numbering is not reliable, so those fall back
/// to matching by title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeSelector {
    /// Season and episode number, both greater than zero.
    Numbers { season: u32, episode: u32 },
    /// Episode title, compared case-insensitively.
    Title(String),
}

impl EpisodeSelector {
    /// Build a selector from the hints a caller supplied, if they identify an
    /// episode at all.
    pub fn from_parts(
        season: Option<u32>,
        episode: Option<u32>,
        title: Option<&str>,
    ) -> Option<Self> {
        match (season, episode) {
            (Some(season), Some(episode)) if season > 0 && episode > 0 => {
                Some(Self::Numbers { season, episode })
            }
            _ => title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| Self::Title(t.to_string())),
        }
    }

    /// Whether an episode with the given attributes is the one selected.
    pub fn matches(&self, season: Option<u32>, episode: Option<u32>, name: Option<&str>) -> bool {
        match self {
            Self::Numbers {
                season: want_season,
                episode: want_episode,
            } => season == Some(*want_season) && episode == Some(*want_episode),
            Self::Title(title) => name.is_some_and(|n| n.trim().eq_ignore_ascii_case(title)),
        }
    }
}

impl std::fmt::Display for EpisodeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numbers { season, episode } => write!(f, "S{season:02}E{episode:02}"),
            Self::Title(title) => write!(f, "\"{title}\""),
        }
    }
}

/// Split a `|`-delimited list, dropping empty items.
pub fn split_delimited(value: &str) -> Vec<&str> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}
