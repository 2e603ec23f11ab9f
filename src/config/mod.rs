//! Configuration management

pub mod pairs;

pub use pairs::{load_pairs, parse_pairs};

use super::types::WatchError;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pair list read when nothing else is configured
pub const DEFAULT_PAIRS_FILE: &str = "config.txt";

/// Delay between two cycles
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(
    name = "dllwatch",
    version,
    about = "Copy changed files to their destinations, retrying the ones that are locked",
    long_about = None
)]
pub struct Cli {
    /// Pair list, one `source > destination` per line
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,

    /// TOML settings file
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Run a single cycle and exit (status 1 if anything is left pending)
    #[arg(long)]
    pub once: bool,

    /// Don't create missing destination directories
    #[arg(long)]
    pub no_create_dirs: bool,
}

/// Optional TOML settings. Command-line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub create_dirs: Option<bool>,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, WatchError> {
        toml::from_str(text).map_err(|e| WatchError::Settings(e.to_string()))
    }

    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, WatchError> {
        let text = fs::read_to_string(path).map_err(|e| {
            WatchError::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}

/// Global configuration for dllwatch
#[derive(Debug, Clone)]
pub struct Config {
    /// Pair list location
    pub pairs_file: PathBuf,

    /// Sleep between cycles
    pub interval: Duration,

    /// Create missing destination parent directories before copying
    pub create_dirs: bool,

    /// Stop after the first cycle
    pub once: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pairs_file: PathBuf::from(DEFAULT_PAIRS_FILE),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            create_dirs: true,
            once: false,
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.interval.is_zero() {
            return Err(WatchError::Config("Poll interval must be greater than zero".to_string()));
        }

        if self.pairs_file.as_os_str().is_empty() {
            return Err(WatchError::Config("Pair list path cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Layer settings and command-line flags over the defaults
    pub fn merge(cli: &Cli, settings: Settings) -> Self {
        let defaults = Self::default();

        let pairs_file = cli
            .config
            .clone()
            .or(settings.config)
            .unwrap_or(defaults.pairs_file);

        let interval = cli
            .interval
            .or(settings.interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);

        let create_dirs = if cli.no_create_dirs {
            false
        } else {
            settings.create_dirs.unwrap_or(defaults.create_dirs)
        };

        Self {
            pairs_file,
            interval,
            create_dirs,
            once: cli.once,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = WatchError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let settings = match &cli.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let config = Config::merge(&cli, settings);
        config.validate()?;
        Ok(config)
    }
}
