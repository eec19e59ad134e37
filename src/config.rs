// src/config.rs
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory watched when nothing else is configured.
pub const DEFAULT_DIR: &str = "./monitor";
/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "dirwatch.toml";
/// Prefix of the environment variables that override the file config.
pub const ENV_PREFIX: &str = "DIRWATCH_";

/// Command-line arguments for the application.
#[derive(Parser, Debug, Deserialize, Default)]
#[clap(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory to monitor (created if missing)
    #[clap(help = "Directory to monitor (created if missing, default \"./monitor\")")]
    pub dir: Option<PathBuf>,

    /// Path to a configuration file (e.g., dirwatch.toml)
    #[clap(
        short,
        long,
        value_parser,
        help = "Path to a configuration file (e.g., dirwatch.toml)"
    )]
    pub config: Option<PathBuf>,

    /// Log level (e.g., trace, debug, info, warn, error)
    #[clap(
        long,
        value_parser,
        help = "Log level (e.g., trace, debug, info, warn, error)"
    )]
    pub log_level: Option<String>,
}

/// Configuration loaded from file, environment, or defaults.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct FileConfig {
    /// Directory to watch
    pub dir: Option<String>,
    /// Log level
    pub log_level: Option<String>,
}

/// Final application configuration after merging all sources.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory to monitor
    pub watch_dir: PathBuf,
    /// Log level
    pub log_level: String,
}

impl AppConfig {
    /// Loads the configuration from the process arguments, the config file,
    /// the environment, and defaults.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_args(CliArgs::parse())
    }

    /// Merges already-parsed CLI arguments over file, environment, and
    /// defaults. Precedence, highest first: CLI, `DIRWATCH_*` env, the
    /// `[dirwatch]` table of the config file, built-in defaults.
    pub fn from_args(cli_args: CliArgs) -> Result<Self, figment::Error> {
        let config_file_path = cli_args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let default_log_level =
            std::env::var("DIRWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut fig = Figment::new()
            .merge(Serialized::defaults(FileConfig {
                dir: Some(DEFAULT_DIR.to_string()),
                log_level: Some(default_log_level.clone()),
            }))
            .merge(Toml::file(config_file_path).nested())
            .merge(Env::prefixed(ENV_PREFIX).only(&["dir", "log_level"]).global());

        if let Some(dir) = &cli_args.dir {
            fig = fig.merge(Serialized::global("dir", dir.to_string_lossy().into_owned()));
        }
        if let Some(level) = &cli_args.log_level {
            fig = fig.merge(Serialized::global("log_level", level));
        }

        let merged: FileConfig = fig.select("dirwatch").extract()?;

        Ok(AppConfig {
            watch_dir: PathBuf::from(merged.dir.unwrap_or_else(|| DEFAULT_DIR.to_string())),
            log_level: merged.log_level.unwrap_or(default_log_level),
        })
    }
}
