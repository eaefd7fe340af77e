//! Showforged - TV show metadata resolution
//!
//! The library resolves series and episode metadata from a local SQLite
//! cache of TheTVDB data, fetching and caching whole series packages on a
//! miss. Concurrent requests for the same show share a single fetch.

pub mod config;
pub mod metadata;
