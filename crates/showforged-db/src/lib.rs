//! Showforged-DB: Metadata cache schema, migrations, and query operations
//!
//! This crate persists TheTVDB metadata in SQLite using rusqlite and r2d2
//! connection pooling. Three record kinds are stored: fuzzy show names,
//! series, and episodes. Every save is an upsert keyed by the record's
//! unique identifier.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use showforged_db::pool::{init_pool, get_conn};
//! use showforged_db::queries::fuzzy_names;
//!
//! let pool = init_pool("/var/lib/showforged/thetvdb.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! if let Some(entry) = fuzzy_names::find_fuzzy_name(&conn, "the office").unwrap() {
//!     println!("{} -> {}", entry.fuzzy_name, entry.series_id);
//! }
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
