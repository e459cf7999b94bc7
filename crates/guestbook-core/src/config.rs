//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/guestbook/config.toml)
//! 3. Environment variables (GUESTBOOK_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix
const ENV_PREFIX: &str = "GUESTBOOK";

/// Default number of greetings returned by a grouped scan
const DEFAULT_FETCH_LIMIT: usize = 20;

/// Errors that can occur while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file contents are not valid TOML
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Failed to write the config file
    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (the SQLite database)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Default number of greetings fetched per book listing
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from the default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (GUESTBOOK_DATA_DIR, GUESTBOOK_FETCH_LIMIT)
    /// 2. Config file (~/.config/guestbook/config.toml or GUESTBOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(toml_content).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // GUESTBOOK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // GUESTBOOK_FETCH_LIMIT (ignored when not a number)
        if let Ok(val) = std::env::var(format!("{}_FETCH_LIMIT", ENV_PREFIX)) {
            if let Ok(limit) = val.parse() {
                self.fetch_limit = limit;
            }
        }
    }

    /// Ensure the data directory exists
    fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir).map_err(|source| {
                ConfigError::CreateDirectory {
                    path: self.data_dir.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// Save configuration to the config file
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with the GUESTBOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guestbook")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("guestbook.db")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("guestbook")
}

/// Default fetch limit for serde
fn default_fetch_limit() -> usize {
    DEFAULT_FETCH_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["GUESTBOOK_DATA_DIR", "GUESTBOOK_FETCH_LIMIT"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch_limit, 20);
        assert!(config.data_dir.ends_with("guestbook"));
    }

    #[test]
    fn test_sqlite_path() {
        let config = Config::default();
        assert!(config.sqlite_path().ends_with("guestbook.db"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("GUESTBOOK_DATA_DIR", "/tmp/guestbook-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/guestbook-test"));
    }

    #[test]
    fn test_env_override_fetch_limit() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert_eq!(config.fetch_limit, 20);

        env::set_var("GUESTBOOK_FETCH_LIMIT", "50");
        config.apply_env_overrides();
        assert_eq!(config.fetch_limit, 50);

        // Garbage values are ignored
        env::set_var("GUESTBOOK_FETCH_LIMIT", "plenty");
        config.apply_env_overrides();
        assert_eq!(config.fetch_limit, 50);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/guestbook"),
            fetch_limit: 35,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("fetch_limit"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.fetch_limit, config.fetch_limit);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            fetch_limit = 5
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.fetch_limit, 5);
    }

    #[test]
    fn test_load_from_str_uses_defaults_for_missing_fields() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.fetch_limit, 20);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("GUESTBOOK_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults (plus env override) when file doesn't exist
        assert_eq!(config.fetch_limit, 20);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let err = Config::load_from_str("fetch_limit = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
