use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for shelfmark.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SHELF_* prefix)
/// 3. Config file (~/.config/shelfmark/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: SHELF_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/shelfmark/shelfmark.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Milliseconds a write waits on SQLite's lock before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Length of a new loan, and of each renewal.
    #[serde(default = "default_loan_days")]
    pub loan_days: u64,

    /// How long a reservation is held before it expires.
    #[serde(default = "default_reservation_days")]
    pub reservation_days: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    level: Option<String>,
    coloured: Option<bool>,
}

impl LoggingConfig {
    /// One of error, warn, info, debug or trace. Defaults to warn so that
    /// command output stays readable.
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("warn")
    }

    pub fn coloured(&self) -> bool {
        self.coloured.unwrap_or(true)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            loan_days: default_loan_days(),
            reservation_days: default_reservation_days(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("shelf");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, letting `--db` win over every other source.
    pub fn load_with_db_path(db_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(path) = db_path {
            config.database_path = path;
        }
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shelfmark")
        .join("shelfmark.db")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

const fn default_loan_days() -> u64 {
    14
}

const fn default_reservation_days() -> u64 {
    7
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/shelfmark/config.toml
/// - macOS: ~/Library/Application Support/shelfmark/config.toml
/// - Windows: %APPDATA%\shelfmark\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shelfmark")
        .join("config.toml")
}

pub fn example_config() -> &'static str {
    r#"# Shelfmark Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SHELF_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite catalog
#
# Can also be set via:
# - CLI: shelfmark --db /custom/path.db status
# - Environment: SHELF_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/shelfmark.db"

# How long (in milliseconds) a write waits for another writer to finish
busy_timeout_ms = 5000

# Loan period in days; renewals extend the due date by the same amount
loan_days = 14

# Days a reservation is held before it expires
reservation_days = 7

[logging]
# error, warn, info, debug or trace
level = "warn"
coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
