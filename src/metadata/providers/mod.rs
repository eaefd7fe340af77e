//! Concrete series source implementations.

pub mod thetvdb;

pub use thetvdb::ThetvdbClient;
