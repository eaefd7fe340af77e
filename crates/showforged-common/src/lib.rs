//! Showforged-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across showforged:
//!
//! - **Error Handling**: Common error type and result alias
//! - **Episode Selectors**: How a caller identifies one episode of a series
//! - **Delimited Lists**: Helpers for the `|`-separated list fields TheTVDB uses
//!
//! # Examples
//!
//! ```
//! use showforged_common::{split_delimited, EpisodeSelector, Error, Result};
//!
//! let selector = EpisodeSelector::from_parts(Some(1), Some(2), None);
//! assert_eq!(selector, Some(EpisodeSelector::Numbers { season: 1, episode: 2 }));
//!
//! assert_eq!(split_delimited("|Drama|Crime|"), vec!["Drama", "Crime"]);
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("empty show name"))
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
