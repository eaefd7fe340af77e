//! Series queries.

use rusqlite::{params, Connection, Row};
use showforged_common::{Error, Result};

use crate::models::SeriesRecord;

const SERIES_COLUMNS: &str = "series_id, name, language, status, overview, first_aired, \
     imdb_id, zap2it_id, rating, genres, actor_names, banner_url, poster_url, fanart_url";

fn row_to_series(row: &Row) -> rusqlite::Result<SeriesRecord> {
    Ok(SeriesRecord {
        series_id: row.get(0)?,
        name: row.get(1)?,
        language: row.get(2)?,
        status: row.get(3)?,
        overview: row.get(4)?,
        first_aired: row.get(5)?,
        imdb_id: row.get(6)?,
        zap2it_id: row.get(7)?,
        rating: row.get(8)?,
        genres: row.get(9)?,
        actor_names: row.get(10)?,
        banner_url: row.get(11)?,
        poster_url: row.get(12)?,
        fanart_url: row.get(13)?,
    })
}

/// Get a series by its TheTVDB id.
pub fn get_series(conn: &Connection, series_id: &str) -> Result<Option<SeriesRecord>> {
    match conn.query_row(
        &format!("SELECT {SERIES_COLUMNS} FROM series WHERE series_id = ?1"),
        params![series_id],
        row_to_series,
    ) {
        Ok(series) => Ok(Some(series)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert a series or overwrite every column of the existing row.
pub fn upsert_series(conn: &Connection, series: &SeriesRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO series (series_id, name, language, status, overview, first_aired,
             imdb_id, zap2it_id, rating, genres, actor_names, banner_url, poster_url, fanart_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(series_id) DO UPDATE SET
             name = excluded.name,
             language = excluded.language,
             status = excluded.status,
             overview = excluded.overview,
             first_aired = excluded.first_aired,
             imdb_id = excluded.imdb_id,
             zap2it_id = excluded.zap2it_id,
             rating = excluded.rating,
             genres = excluded.genres,
             actor_names = excluded.actor_names,
             banner_url = excluded.banner_url,
             poster_url = excluded.poster_url,
             fanart_url = excluded.fanart_url,
             updated_at = datetime('now')",
        params![
            series.series_id,
            series.name,
            series.language,
            series.status,
            series.overview,
            series.first_aired,
            series.imdb_id,
            series.zap2it_id,
            series.rating,
            series.genres,
            series.actor_names,
            series.banner_url,
            series.poster_url,
            series.fanart_url,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}
