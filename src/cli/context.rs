use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::store::SqliteStore;
use crate::errors::{AppError, AppResult};
use crate::models::location::GeoPoint;
use crate::models::session::EmployeeId;
use crate::ui::messages::warning;
use crate::utils::path::expand_tilde;
use crate::utils::time::parse_instant;
use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use std::path::PathBuf;

/// Everything a command needs besides its own arguments:
/// the loaded config, where it came from, and the request's `now`.
pub struct Context {
    pub cfg: Config,
    pub config_path: PathBuf,
    pub offset: FixedOffset,
    pub now: DateTime<Utc>,
}

impl Context {
    /// Load config once, apply `--db`, resolve the offset and `now`.
    pub fn from_cli(cli: &Cli) -> AppResult<Self> {
        let config_path = match &cli.config {
            Some(p) => expand_tilde(p),
            None => Config::config_file(),
        };

        let mut cfg = Config::load_from(&config_path)?;
        if let Some(custom_db) = &cli.db {
            cfg.database = expand_tilde(custom_db).to_string_lossy().to_string();
        }

        let offset = cfg.offset()?;
        let now = match &cli.at {
            Some(at) => parse_instant(at, offset)?,
            None => Utc::now().trunc_subsecs(0),
        };

        Ok(Self {
            cfg,
            config_path,
            offset,
            now,
        })
    }

    pub fn open_store(&self) -> AppResult<SqliteStore> {
        SqliteStore::open(&self.cfg.database)
    }

    /// `--employee`, falling back to `default_employee` from the config.
    pub fn employee(&self, arg: &Option<String>) -> AppResult<EmployeeId> {
        match arg.as_ref().or(self.cfg.default_employee.as_ref()) {
            Some(e) => EmployeeId::new(e.as_str()),
            None => Err(AppError::InvalidEmployee(
                "missing --employee (and no default_employee configured)".into(),
            )),
        }
    }

    /// Locations are best effort: a bad value is dropped with a warning.
    pub fn location(&self, arg: &Option<String>) -> Option<GeoPoint> {
        let raw = arg.as_deref()?;
        match raw.parse::<GeoPoint>() {
            Ok(p) => Some(p),
            Err(e) => {
                warning(format!("Ignoring location: {}", e));
                None
            }
        }
    }
}
