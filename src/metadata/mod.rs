//! TV metadata resolution backed by a local TheTVDB cache.
//!
//! # Module layout
//!
//! - [`engine`] -- Public entry point; cache-first resolve with remote fallback.
//! - [`lookup`] -- Read-only cache walk (fuzzy name, series, episode).
//! - [`coordinator`] -- Wait-list that coalesces concurrent remote fetches.
//! - [`store`] -- Async [`RecordStore`] trait and its SQLite implementation.
//! - [`provider`] -- Remote source and document parser traits.
//! - [`providers`] -- TheTVDB HTTP client.
//! - [`package`] -- Zip/XML package parsing.
//! - [`media`] -- The media record, field keys, and merge rules.
//! - [`language`] -- Preferred-language selection.

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod language;
pub mod lookup;
pub mod media;
pub mod package;
pub mod provider;
pub mod providers;
pub mod store;

pub use coordinator::{FetchCoordinator, FetchResult, FetchTarget};
pub use engine::{ResolveEngine, ResolveOptions, ResolveOutcome};
pub use error::ResolveError;
pub use lookup::{CacheLookup, LookupResult};
pub use media::{may_resolve, merge_fields, FieldKey, Media};
pub use package::{PackageError, TvdbPackageParser};
pub use provider::{DocumentParser, SeriesPackage, SeriesSource};
pub use providers::ThetvdbClient;
pub use store::{RecordStore, SqliteRecordStore};
