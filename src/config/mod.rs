use crate::errors::{AppError, AppResult};
use crate::models::Direction;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration, stored as YAML. Every field has a default so older or
/// hand-trimmed files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Number of distinct dates per `list` page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Newest date first unless configured otherwise.
    #[serde(default = "default_dates_dir")]
    pub dates_dir: Direction,
    #[serde(default = "default_times_dir")]
    pub times_dir: Direction,
    /// Default `env_logger` filter; `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_page_size() -> usize {
    7
}
fn default_dates_dir() -> Direction {
    Direction::FutureToPast
}
fn default_times_dir() -> Direction {
    Direction::PastToFuture
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            page_size: default_page_size(),
            dates_dir: default_dates_dir(),
            times_dir: default_times_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("timereaper")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".timereaper")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("timereaper.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("timereaper.sqlite")
    }

    /// Database location with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        expand_tilde(&self.database)
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Resolve the database path for `init`: a custom name relative to the
    /// config directory, an absolute path as-is, or the default file.
    pub fn resolve_database(custom_name: Option<&str>) -> PathBuf {
        match custom_name {
            Some(name) => {
                let p = expand_tilde(name);
                if p.is_absolute() {
                    p
                } else {
                    Self::config_dir().join(p)
                }
            }
            None => Self::database_file(),
        }
    }

    /// Create the config directory and, unless in test mode, write the
    /// config file. Returns the configured database path.
    pub fn init_all(custom_name: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = Self::resolve_database(custom_name);
        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Self::default()
        };

        if !is_test {
            fs::write(Self::config_file(), config.to_yaml()?)?;
            log::info!("wrote {}", Self::config_file().display());
        }

        Ok(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.conf");
        fs::write(&path, "database: /tmp/x.sqlite\ndates_dir: past_to_future\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.page_size, 7);
        assert_eq!(cfg.dates_dir, Direction::PastToFuture);
        assert_eq!(cfg.times_dir, Direction::PastToFuture);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.conf");
        fs::write(&path, "page_size: [not a number\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn yaml_round_trip() {
        let cfg = Config {
            page_size: 3,
            ..Config::default()
        };
        let back: Config = serde_yaml::from_str(&cfg.to_yaml().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
