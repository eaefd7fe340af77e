//! Database query operations.
//!
//! Free functions over a `&Connection`, grouped by record kind. Lookups return
//! `Ok(None)` on no match and `Err` only on storage failures.

pub mod episodes;
pub mod fuzzy_names;
pub mod series;
