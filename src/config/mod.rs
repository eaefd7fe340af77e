pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

use crate::metadata::language::supported_language;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./showforged.toml",
        "~/.config/showforged/config.toml",
        "/etc/showforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let tvdb = &config.thetvdb;

    if tvdb.requests_per_second == 0 {
        anyhow::bail!("thetvdb.requests_per_second must be greater than 0");
    }

    if tvdb.timeout_secs == 0 {
        anyhow::bail!("thetvdb.timeout_secs must be greater than 0");
    }

    if !(tvdb.base_url.starts_with("http://") || tvdb.base_url.starts_with("https://")) {
        anyhow::bail!(
            "thetvdb.base_url must be an http(s) URL, got {:?}",
            tvdb.base_url
        );
    }

    if tvdb.api_key.is_empty() && !config.resolver.cache_only {
        tracing::warn!("No TheTVDB API key configured; only cached metadata will be available");
    }

    for language in &config.resolver.languages {
        if supported_language(language).is_none() {
            tracing::warn!("Language {:?} is not served by TheTVDB and will be skipped", language);
        }
    }

    Ok(())
}
