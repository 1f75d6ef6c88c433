use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".routine-tracker";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "routines.sqlite";
/// Optional settings file inside the data directory.
const CONFIG_FILE_NAME: &str = "config.toml";
/// Log file inside the data directory. The terminal belongs to the TUI.
const LOG_FILE_NAME: &str = "routine-tracker.log";

/// Runtime settings. Every field has a default so an absent or partial
/// `config.toml` is fine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides `<data dir>/routines.sqlite`.
    pub database_path: Option<PathBuf>,
    /// Upper bound for every store request.
    pub request_timeout_ms: u64,
    /// `tracing` filter directive, e.g. `"info"` or `"routine_tracker=debug"`.
    pub log_filter: String,
    /// Whose profile the profile screen loads.
    pub user_id: String,
    #[serde(skip)]
    data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            request_timeout_ms: 5_000,
            log_filter: "info".to_string(),
            user_id: "local".to_string(),
            data_dir: PathBuf::new(),
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from the default data directory under the user's home.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_data_dir()?)
    }

    /// Load settings rooted at `data_dir`, creating the directory if needed.
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).context("failed to create data directory")?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            Self::parse(&raw).with_context(|| format!("invalid {}", config_path.display()))?
        } else {
            Self::default()
        };

        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    /// Parse and validate TOML settings.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw).context("failed to parse settings")?;
        if config.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        if config.user_id.trim().is_empty() {
            return Err(anyhow!("user_id must not be blank"));
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DB_FILE_NAME))
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Resolve `~/.routine-tracker`.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
