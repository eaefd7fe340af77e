mod cli;

use showforged::config;
use showforged::metadata::language::{system_language_names, SUPPORTED_LANGUAGES};
use showforged::metadata::{
    may_resolve, FieldKey, Media, RecordStore, ResolveEngine, ResolveOptions, SqliteRecordStore,
    ThetvdbClient, TvdbPackageParser,
};
use showforged_db::pool::init_pool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ResolveArgs};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "showforged=trace,showforged_db=debug,reqwest=debug".to_string()
        } else {
            "showforged=info,showforged_db=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve(args, cli.config.as_deref()))
        }
        Commands::Aliases { series_id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_aliases(&series_id, cli.config.as_deref()))
        }
        Commands::Languages => {
            for language in SUPPORTED_LANGUAGES {
                println!("{language}");
            }
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::InitConfig { path } => init_config(&path),
        Commands::SetApiKey { api_key } => set_api_key(&api_key, cli.config.as_deref()),
        Commands::Version => {
            println!("showforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_store(config: &config::Config) -> Result<Arc<SqliteRecordStore>> {
    let db_path = config.database.expanded_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache directory: {:?}", parent))?;
    }

    tracing::debug!("Opening metadata cache at {}", db_path.display());
    let pool = init_pool(&db_path.to_string_lossy())?;
    Ok(Arc::new(SqliteRecordStore::new(pool)))
}

async fn resolve(args: ResolveArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;

    let client = ThetvdbClient::new(&config.thetvdb)?;
    let parser = TvdbPackageParser::new(&config.thetvdb.base_url);

    let mut languages = config.resolver.languages.clone();
    languages.extend(system_language_names());
    let engine = ResolveEngine::with_languages(store, Arc::new(client), Arc::new(parser), languages);

    let keys = if args.keys.is_empty() {
        FieldKey::ALL.to_vec()
    } else {
        args.keys
    };

    let mut media = Media {
        show: args.show,
        series_id: args.series_id,
        season: args.season,
        episode: args.episode,
        episode_title: args.title,
        ..Default::default()
    };

    for key in &keys {
        if let Err(missing) = may_resolve(&media, *key) {
            let missing: Vec<_> = missing.iter().map(|k| k.as_str()).collect();
            tracing::debug!("Cannot resolve {} without: {}", key, missing.join(", "));
        }
    }

    let options = ResolveOptions {
        language: args.language,
        cache_only: args.cache_only || config.resolver.cache_only,
    };

    let outcome = engine.resolve(&mut media, &keys, &options).await?;
    tracing::info!(outcome = ?outcome, "Resolve finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&media)?);
    } else {
        print_media(&media);
    }

    Ok(())
}

fn print_media(media: &Media) {
    let value = match serde_json::to_value(media) {
        Ok(serde_json::Value::Object(fields)) => fields,
        _ => return,
    };

    if value.is_empty() {
        println!("No metadata found.");
        return;
    }

    for (field, value) in value {
        let rendered = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };
        println!("{:<20} {}", format!("{field}:"), rendered);
    }
}

async fn list_aliases(series_id: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;

    let names = store.fuzzy_names_for_series(series_id).await?;
    if names.is_empty() {
        println!("No names cached for series {series_id}.");
    }
    for entry in names {
        println!("{}", entry.fuzzy_name);
    }

    Ok(())
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Configuration is valid.");
    println!("Cache: {}", config.database.expanded_path().display());
    println!("TheTVDB: {}", config.thetvdb.base_url);
    println!(
        "API key: {}",
        if config.thetvdb.api_key.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    if !config.resolver.languages.is_empty() {
        println!("Languages: {}", config.resolver.languages.join(", "));
    }

    Ok(())
}

fn init_config(path: &str) -> Result<()> {
    let path = shellexpand::tilde(path);
    let path = Path::new(path.as_ref());
    if path.exists() {
        anyhow::bail!("Config file already exists: {:?}", path);
    }

    config::persist::save_config(path, &config::Config::default())?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn set_api_key(api_key: &str, config_path: Option<&Path>) -> Result<()> {
    let default_path = shellexpand::tilde("~/.config/showforged/config.toml");
    let path = config_path.unwrap_or_else(|| Path::new(default_path.as_ref()));

    if !path.exists() {
        config::persist::save_config(path, &config::Config::default())?;
    }

    config::persist::update_api_key(path, api_key)?;
    println!("Saved API key to {}", path.display());
    Ok(())
}
