//! Configuration persistence using toml_edit to preserve formatting and comments.

use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::{value, DocumentMut};

/// Save the entire config to a TOML file
pub fn save_config(path: &Path, config: &super::Config) -> Result<()> {
    let new_content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    let new_doc: DocumentMut = new_content
        .parse()
        .with_context(|| "Failed to parse serialized config")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, new_doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Update just the TheTVDB API key, leaving the rest of the file untouched
pub fn update_api_key(path: &Path, api_key: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    doc["thetvdb"]["api_key"] = value(api_key);

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
