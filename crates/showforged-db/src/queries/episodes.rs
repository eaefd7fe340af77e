//! Episode queries.

use rusqlite::{params, Connection, Row};
use showforged_common::{EpisodeSelector, Error, Result};

use crate::models::EpisodeRecord;

const EPISODE_COLUMNS: &str = "episode_id, series_id, season_id, language, season_number, \
     episode_number, absolute_number, episode_name, overview, first_aired, imdb_id, \
     director_names, guest_star_names, screenshot_url, rating";

fn row_to_episode(row: &Row) -> rusqlite::Result<EpisodeRecord> {
    Ok(EpisodeRecord {
        episode_id: row.get(0)?,
        series_id: row.get(1)?,
        season_id: row.get(2)?,
        language: row.get(3)?,
        season_number: row.get(4)?,
        episode_number: row.get(5)?,
        absolute_number: row.get(6)?,
        episode_name: row.get(7)?,
        overview: row.get(8)?,
        first_aired: row.get(9)?,
        imdb_id: row.get(10)?,
        director_names: row.get(11)?,
        guest_star_names: row.get(12)?,
        screenshot_url: row.get(13)?,
        rating: row.get(14)?,
    })
}

/// Find the episode of a series a selector names.
///
/// Numeric selectors match `(season_number, episode_number)`; title selectors
/// match `episode_name` case-insensitively. When several rows match, the one
/// with the lowest absolute number wins.
pub fn find_episode(
    conn: &Connection,
    series_id: &str,
    selector: &EpisodeSelector,
) -> Result<Option<EpisodeRecord>> {
    let result = match selector {
        EpisodeSelector::Numbers { season, episode } => conn.query_row(
            &format!(
                "SELECT {EPISODE_COLUMNS} FROM episodes
                 WHERE series_id = ?1 AND season_number = ?2 AND episode_number = ?3
                 ORDER BY absolute_number, episode_id LIMIT 1"
            ),
            params![series_id, season, episode],
            row_to_episode,
        ),
        EpisodeSelector::Title(title) => conn.query_row(
            &format!(
                "SELECT {EPISODE_COLUMNS} FROM episodes
                 WHERE series_id = ?1 AND episode_name = ?2 COLLATE NOCASE
                 ORDER BY season_number, episode_number, episode_id LIMIT 1"
            ),
            params![series_id, title.trim()],
            row_to_episode,
        ),
    };

    match result {
        Ok(episode) => Ok(Some(episode)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert an episode or overwrite the existing row with the same id.
pub fn upsert_episode(conn: &Connection, episode: &EpisodeRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO episodes (episode_id, series_id, season_id, language, season_number,
             episode_number, absolute_number, episode_name, overview, first_aired, imdb_id,
             director_names, guest_star_names, screenshot_url, rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
         ON CONFLICT(episode_id) DO UPDATE SET
             series_id = excluded.series_id,
             season_id = excluded.season_id,
             language = excluded.language,
             season_number = excluded.season_number,
             episode_number = excluded.episode_number,
             absolute_number = excluded.absolute_number,
             episode_name = excluded.episode_name,
             overview = excluded.overview,
             first_aired = excluded.first_aired,
             imdb_id = excluded.imdb_id,
             director_names = excluded.director_names,
             guest_star_names = excluded.guest_star_names,
             screenshot_url = excluded.screenshot_url,
             rating = excluded.rating,
             updated_at = datetime('now')",
        params![
            episode.episode_id,
            episode.series_id,
            episode.season_id,
            episode.language,
            episode.season_number,
            episode.episode_number,
            episode.absolute_number,
            episode.episode_name,
            episode.overview,
            episode.first_aired,
            episode.imdb_id,
            episode.director_names,
            episode.guest_star_names,
            episode.screenshot_url,
            episode.rating,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Upsert a batch of episodes in a single transaction.
///
/// Returns the number of episodes written. Either all rows land or none do.
pub fn upsert_episodes(conn: &Connection, episodes: &[EpisodeRecord]) -> Result<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    for episode in episodes {
        upsert_episode(&tx, episode)?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(episodes.len())
}

/// Number of cached episodes for a series.
pub fn count_for_series(conn: &Connection, series_id: &str) -> Result<usize> {
    conn.query_row(
        "SELECT COUNT(*) FROM episodes WHERE series_id = ?1",
        params![series_id],
        |row| row.get::<_, usize>(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
