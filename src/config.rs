use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

const MIN_CACHE_WINDOW_SECS: u64 = 60;
const MAX_CACHE_WINDOW_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Tabular source; relative paths resolve against the config file's directory
    pub data_path: PathBuf,
    pub delimiter: char,
    pub category_column: String,
    pub value_column: String,
    /// Default number of rows returned by the rows preview
    pub preview_rows: usize,
    pub derived_column: String,
    pub derived_factor: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/transactions.csv"),
            delimiter: ';',
            category_column: "branch".to_string(),
            value_column: "fare_charged".to_string(),
            preview_rows: 10,
            derived_column: "fare_with_tax".to_string(),
            derived_factor: 1.19,
        }
    }
}

impl StorageConfig {
    /// Delimiter as the single byte the CSV reader expects.
    /// Quotes and line terminators are reserved by the reader.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(ConfigError::invalid(
                "storage.delimiter",
                format!("{:?} is reserved for quoting or line endings", self.delimiter),
            )),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(ConfigError::invalid(
                "storage.delimiter",
                format!("'{}' is not a single ASCII character", c),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub cache_window_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            cache_window_secs: 300,
            timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn cache_window(&self) -> Duration {
        Duration::from_secs(self.cache_window_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from `DASHBOARD_CONFIG` (or `config.toml`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load configuration from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let mut config = Self::from_toml(&raw)?;
            if let Some(dir) = path.parent() {
                config.resolve_relative_to(dir);
            }
            config
        } else {
            Self::default()
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        if self.storage.data_path.is_relative() && !dir.as_os_str().is_empty() {
            self.storage.data_path = dir.join(&self.storage.data_path);
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", format!("'{}' is not a port", port)))?;
        }
        if let Ok(host) = std::env::var("DASHBOARD_HOST") {
            self.server.host = host;
        }
        if let Ok(path) = std::env::var("DASHBOARD_DATA_PATH") {
            self.storage.data_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("DASHBOARD_API_URL") {
            self.client.base_url = url;
        }
        if let Ok(secs) = std::env::var("DASHBOARD_CACHE_SECS") {
            self.client.cache_window_secs = secs.parse().map_err(|_| {
                ConfigError::invalid("DASHBOARD_CACHE_SECS", format!("'{}' is not a number", secs))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.delimiter_byte()?;

        if self.storage.preview_rows == 0 {
            return Err(ConfigError::invalid(
                "storage.preview_rows",
                "must be greater than 0",
            ));
        }
        if self.storage.category_column.trim().is_empty() {
            return Err(ConfigError::invalid("storage.category_column", "cannot be empty"));
        }
        if self.storage.value_column.trim().is_empty() {
            return Err(ConfigError::invalid("storage.value_column", "cannot be empty"));
        }
        let derived = &self.storage.derived_column;
        if derived.trim().is_empty() {
            return Err(ConfigError::invalid("storage.derived_column", "cannot be empty"));
        }
        if *derived == self.storage.category_column || *derived == self.storage.value_column {
            return Err(ConfigError::invalid(
                "storage.derived_column",
                format!("'{}' would overwrite a source column", derived),
            ));
        }

        validate_cache_window(self.client.cache_window_secs)?;

        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("client.base_url", "cannot be empty"));
        }
        Ok(())
    }
}

pub fn validate_cache_window(secs: u64) -> Result<(), ConfigError> {
    if !(MIN_CACHE_WINDOW_SECS..=MAX_CACHE_WINDOW_SECS).contains(&secs) {
        return Err(ConfigError::invalid(
            "client.cache_window_secs",
            format!(
                "{} is outside {}..={} seconds",
                secs, MIN_CACHE_WINDOW_SECS, MAX_CACHE_WINDOW_SECS
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.delimiter, ';');
        assert_eq!(config.client.base_url, "http://localhost:8000");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [storage]
            delimiter = ","
            category_column = "region"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.delimiter_byte().unwrap(), b',');
        assert_eq!(config.storage.category_column, "region");
        assert_eq!(config.storage.value_column, "fare_charged");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn rejects_cache_window_out_of_range() {
        let mut config = AppConfig::default();
        config.client.cache_window_secs = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "client.cache_window_secs", .. })
        ));

        config.client.cache_window_secs = 600;
        config.validate().unwrap();
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        let mut config = AppConfig::default();
        config.storage.delimiter = '§';
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_derived_column_shadowing_value_column() {
        let mut config = AppConfig::default();
        config.storage.derived_column = config.storage.value_column.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "storage.derived_column", .. })
        ));
    }

    #[test]
    fn rejects_quote_and_line_terminator_delimiters() {
        for delimiter in ['"', '\n', '\r'] {
            let config = AppConfig {
                storage: StorageConfig {
                    delimiter,
                    ..StorageConfig::default()
                },
                ..AppConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid { key: "storage.delimiter", .. })
            ));
        }

        let tab = StorageConfig {
            delimiter: '\t',
            ..StorageConfig::default()
        };
        assert_eq!(tab.delimiter_byte().unwrap(), b'\t');
    }

    #[test]
    fn relative_data_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        std::fs::write(&path, "[storage]\ndata_path = \"data/t.csv\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.storage.data_path, dir.path().join("data/t.csv"));
    }
}
