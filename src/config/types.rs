use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub thetvdb: TheTvdbConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite cache; `~` is expanded
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("~/.local/share/showforged/thetvdb.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// The cache path with `~` expanded.
    pub fn expanded_path(&self) -> PathBuf {
        let raw = self.path.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TheTvdbConfig {
    /// API key; without one the resolver only serves cached data
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Retries after an HTTP 429 before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    crate::metadata::providers::thetvdb::DEFAULT_BASE_URL.to_string()
}
fn default_requests_per_second() -> u32 {
    4
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout() -> u64 {
    30
}

impl Default for TheTvdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Preferred languages, most preferred first. Empty means the process
    /// locale decides.
    #[serde(default)]
    pub languages: Vec<String>,

    /// Never contact TheTVDB; only cached data is used
    #[serde(default)]
    pub cache_only: bool,
}
