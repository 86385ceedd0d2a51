use crate::core::triggers::{TriggerEngine, TriggerSpec};
use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use crate::utils::time::parse_offset;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".fieldclock";
const CONFIG_NAME: &str = "fieldclock.conf";
const DB_NAME: &str = "fieldclock.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Offset used to read `--at`, render times and evaluate trigger rules.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_employee: Option<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            utc_offset: default_utc_offset(),
            default_employee: None,
            triggers: Vec::new(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory (`~/.fieldclock`)
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_NAME)
    }

    /// Return the default path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DB_NAME)
    }

    /// Load configuration from `path`, or return defaults if it does not exist.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn offset(&self) -> AppResult<FixedOffset> {
        parse_offset(&self.utc_offset)
    }

    /// Validate the configured triggers and build the engine.
    pub fn trigger_engine(&self) -> AppResult<TriggerEngine> {
        TriggerEngine::from_specs(&self.triggers, self.offset()?)
    }

    /// Create the config directory, the config file (unless `is_test`) and an
    /// empty database file. Returns the database path.
    pub fn init_all(
        config_path: &Path,
        custom_db: Option<&str>,
        is_test: bool,
    ) -> AppResult<PathBuf> {
        let dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_dir);
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => expand_tilde(name),
            None => dir.join(DB_NAME),
        };

        if !is_test {
            // keep user-edited settings (triggers, offset) on re-init
            let mut cfg = Config::load_from(config_path)?;
            cfg.database = db_path.to_string_lossy().to_string();
            cfg.save_to(config_path)?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}
