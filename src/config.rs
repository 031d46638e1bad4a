// Shell configuration. The core functions take explicit paths; only the
// binary reads the environment.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_CATALOG_PATH: &str = "car_catalog.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub log_level: String,
    /// Log destination for interactive mode, where stderr is the screen
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            catalog_path: lookup("CAR_CATALOG_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            log_level: lookup("RUST_LOG")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.log_level),
            log_file: lookup("CAR_RENTAL_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Builder pattern: override the catalog path (e.g. from `--catalog`)
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }
}
