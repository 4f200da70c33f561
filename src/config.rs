use crate::core::{Result, StoreError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides `database.path`.
pub const ENV_DB_PATH: &str = "TABULA_DB_PATH";
/// Overrides `database.connect_timeout_secs`.
pub const ENV_CONNECT_TIMEOUT: &str = "TABULA_CONNECT_TIMEOUT";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.verbose)
            .unwrap_or(false)
    }
}

/// Connection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database file, or `:memory:`.
    pub path: String,
    /// How long a statement waits on a locked database, in seconds.
    pub connect_timeout_secs: Option<u64>,
    pub foreign_keys: Option<bool>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::in_memory()
    }
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        DatabaseConfig::at(":memory:")
    }

    pub fn at(path: impl Into<String>) -> Self {
        DatabaseConfig {
            path: path.into(),
            connect_timeout_secs: None,
            foreign_keys: None,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    /// Applies `TABULA_DB_PATH` / `TABULA_CONNECT_TIMEOUT` when set.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(ENV_DB_PATH).ok(),
            std::env::var(ENV_CONNECT_TIMEOUT).ok(),
        )
    }

    fn with_overrides(mut self, path: Option<String>, timeout: Option<String>) -> Result<Self> {
        if let Some(path) = path {
            self.path = path;
        }
        if let Some(raw) = timeout {
            let secs = raw.trim().parse::<u64>().map_err(|err| {
                StoreError::Config(format!("{ENV_CONNECT_TIMEOUT}={raw:?} is not a number of seconds: {err}"))
            })?;
            self.connect_timeout_secs = Some(secs);
        }
        Ok(self)
    }
}

/// Logging-related configuration.
#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = tabula::config::load_config("tabula.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    if config.database.path.is_empty() {
        return Err(StoreError::Config("database.path must not be empty".to_string()));
    }
    Ok(config)
}

/// `<config dir>/tabula/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tabula").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CONFIG: &str = r#"
[database]
path = "/var/lib/tabula/test_db.sqlite"
connect_timeout_secs = 10
foreign_keys = false

[logging]
verbose = true
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.database.path, "/var/lib/tabula/test_db.sqlite");
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.database.foreign_keys, Some(false));
        assert!(config.verbose());
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(5));
        assert!(!config.verbose());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.database.connect_timeout_secs, Some(10));

        let mut empty_path = tempfile::NamedTempFile::new().unwrap();
        empty_path.write_all(b"[database]\npath = \"\"\n").unwrap();
        assert!(matches!(load_config(empty_path.path()), Err(StoreError::Config(_))));

        assert!(matches!(load_config("/nonexistent/tabula.toml"), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_overrides() {
        let config = DatabaseConfig::in_memory()
            .with_overrides(Some("other.db".to_string()), Some(" 7 ".to_string()))
            .unwrap();
        assert_eq!(config.path, "other.db");
        assert_eq!(config.connect_timeout(), Duration::from_secs(7));

        let err = DatabaseConfig::in_memory()
            .with_overrides(None, Some("soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
