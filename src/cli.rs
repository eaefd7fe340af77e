use clap::{Args, Parser, Subcommand};
use showforged::metadata::FieldKey;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "showforged")]
#[command(author, version, about = "TV show metadata resolver backed by a local TheTVDB cache")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve metadata for a show or episode
    Resolve(ResolveArgs),

    /// List the fuzzy names cached for a series
    Aliases {
        /// TheTVDB series id
        series_id: String,
    },

    /// List the languages TheTVDB serves
    Languages,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write the file
        #[arg(default_value = "~/.config/showforged/config.toml")]
        path: String,
    },

    /// Store a TheTVDB API key in a configuration file
    SetApiKey {
        /// The API key
        api_key: String,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Show name as it appears in the file name or library
    #[arg(long)]
    pub show: Option<String>,

    /// TheTVDB series id, if already known
    #[arg(long)]
    pub series_id: Option<String>,

    /// Season number
    #[arg(short, long)]
    pub season: Option<u32>,

    /// Episode number within the season
    #[arg(short, long)]
    pub episode: Option<u32>,

    /// Episode title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Fields to resolve, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub keys: Vec<FieldKey>,

    /// Preferred language (two-letter tag)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Use cached data only; never contact TheTVDB
    #[arg(long)]
    pub cache_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
