//! Fuzzy show-name queries.
//!
//! Names are trimmed before they are stored or looked up; the column's
//! `NOCASE` collation makes matching ASCII case-insensitive.

use rusqlite::{params, Connection};
use showforged_common::{Error, Result};

use crate::models::FuzzyNameEntry;

/// Look up the series a free-text show name maps to.
pub fn find_fuzzy_name(conn: &Connection, name: &str) -> Result<Option<FuzzyNameEntry>> {
    match conn.query_row(
        "SELECT fuzzy_name, series_id FROM fuzzy_series_names WHERE fuzzy_name = ?1",
        params![name.trim()],
        |row| {
            Ok(FuzzyNameEntry {
                fuzzy_name: row.get(0)?,
                series_id: row.get(1)?,
            })
        },
    ) {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert a fuzzy name, or repoint an existing one at a new series.
pub fn upsert_fuzzy_name(conn: &Connection, entry: &FuzzyNameEntry) -> Result<()> {
    let name = entry.fuzzy_name.trim();
    if name.is_empty() {
        return Err(Error::invalid_input("fuzzy name must not be empty"));
    }

    conn.execute(
        "INSERT INTO fuzzy_series_names (fuzzy_name, series_id) VALUES (?1, ?2)
         ON CONFLICT(fuzzy_name) DO UPDATE SET series_id = excluded.series_id",
        params![name, entry.series_id],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// All fuzzy names pointing at a series.
pub fn list_for_series(conn: &Connection, series_id: &str) -> Result<Vec<FuzzyNameEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT fuzzy_name, series_id FROM fuzzy_series_names
             WHERE series_id = ?1 ORDER BY created_at, fuzzy_name",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(params![series_id], |row| {
            Ok(FuzzyNameEntry {
                fuzzy_name: row.get(0)?,
                series_id: row.get(1)?,
            })
        })
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}
