//! TOML-based configuration for rollup.
//!
//! Supports a config file (rollup.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! column_prefix = "agg_"
//! max_limit = 5000
//!
//! [sql]
//! dialect = "postgres"
//! schema = "analytics"
//!
//! [connections.default]
//! driver = "sqlite"
//! path = "${ROLLUP_DATA_DIR}/metrics.db"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::result::ResultOptions;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Engine behavior.
    pub engine: EngineSettings,

    /// SQL rendering.
    pub sql: SqlSettings,

    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,
}

/// Engine behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Prefix put in front of every result column alias and stripped again
    /// when rows are loaded.
    pub column_prefix: Option<String>,

    /// Upper bound for LIMIT; 0 disables the clamp.
    pub max_limit: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            column_prefix: None,
            max_limit: 10_000,
        }
    }
}

impl EngineSettings {
    /// The limit clamp, if enabled.
    pub fn max_limit(&self) -> Option<u64> {
        (self.max_limit > 0).then_some(self.max_limit)
    }
}

/// SQL rendering settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Dialect used to render queries; the executor's own dialect when unset.
    pub dialect: Option<Dialect>,

    /// Schema qualifying the aggregated table.
    pub schema: Option<String>,
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// SQLite file or in-memory database.
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite",
        }
    }

    /// Dialect the driver speaks.
    pub fn dialect(&self) -> Dialect {
        match self {
            Driver::Sqlite => Dialect::Sqlite,
        }
    }
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    pub driver: Driver,

    /// Database path (supports ${ENV_VAR} expansion); `:memory:` for an
    /// in-memory database.
    pub path: String,
}

impl ConnectionSettings {
    /// Get the path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.path)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ROLLUP_CONFIG`
    /// 2. `./rollup.toml`
    /// 3. `~/.config/rollup/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("ROLLUP_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("rollup.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("rollup").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else any).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    /// Result options implied by the engine section.
    pub fn result_options(&self) -> ResultOptions {
        ResultOptions {
            column_prefix: self.engine.column_prefix.clone(),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.next_if_eq(&'{').is_some() {
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Lone $
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
