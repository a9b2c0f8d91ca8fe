//! TOML-based configuration.
//!
//! Supports a config file (`catalogql.toml`) with environment variable
//! expansion in connection strings and paths.
//!
//! Example configuration:
//! ```toml
//! [connections.default]
//! driver = "trino"
//! connection_string = "${TRINO_URL}"
//!
//! [worker]
//! path = "./catalogql-worker"
//! timeout_seconds = 30
//!
//! [worker.pool]
//! max_idle_conns = 5
//! max_open_conns = 10
//! conn_max_lifetime = "5m"
//! conn_max_idle_time = "1m"
//!
//! [discovery]
//! exclude_catalogs = ["system"]
//! exclude_schemas = ["information_schema"]
//! replace_invalid_characters = false
//! ignore_invalid_names = true
//!
//! [cache]
//! enabled = true
//!
//! [query]
//! default_limit = 1000
//!
//! [joins]
//! strategy = "same_schema"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ident::restore;
use crate::joins::JoinStrategy;
use crate::metadata::WalkerOptions;
use crate::query::DEFAULT_LIMIT;
use crate::worker::DEFAULT_TIMEOUT_SECS;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CATALOGQL_CONFIG";

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

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named engine connections.
    pub connections: BTreeMap<String, ConnectionSettings>,
    pub worker: WorkerSettings,
    pub discovery: DiscoverySettings,
    pub cache: CacheSettings,
    pub query: QuerySettings,
    pub joins: JoinSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Worker driver name.
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl ConnectionSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to the worker binary; searched for when absent.
    pub path: Option<String>,

    /// Per-request timeout.
    pub timeout_seconds: u64,

    /// Connection pool settings, owned by the worker.
    pub pool: PoolSettings,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of idle connections per pool.
    pub max_idle_conns: u32,

    /// Maximum number of open connections per pool.
    pub max_open_conns: u32,

    /// Maximum connection lifetime (e.g., "5m", "1h").
    pub conn_max_lifetime: String,

    /// Maximum connection idle time (e.g., "1m", "30s").
    pub conn_max_idle_time: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 5,
            max_open_conns: 10,
            conn_max_lifetime: "5m".to_string(),
            conn_max_idle_time: "1m".to_string(),
        }
    }
}

impl PoolSettings {
    /// Convert to worker command-line arguments.
    pub fn to_worker_args(&self) -> Vec<String> {
        vec![
            "-pool".to_string(),
            format!("-pool-max-idle={}", self.max_idle_conns),
            format!("-pool-max-open={}", self.max_open_conns),
            format!("-pool-conn-lifetime={}", self.conn_max_lifetime),
            format!("-pool-conn-idle={}", self.conn_max_idle_time),
        ]
    }
}

/// Which catalogs and schemas are exposed, and how names are treated.
///
/// Include/exclude entries match either the discovered name or its restored
/// raw form, so raw engine names can be written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Only these catalogs, when set.
    pub include_catalogs: Option<Vec<String>>,
    pub exclude_catalogs: Vec<String>,
    /// Only these schemas, when set.
    pub include_schemas: Option<Vec<String>>,
    pub exclude_schemas: Vec<String>,
    /// Sanitize discovered names.
    pub replace_invalid_characters: bool,
    /// Drop objects whose names violate the identifier grammar.
    pub ignore_invalid_names: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            include_catalogs: None,
            exclude_catalogs: Vec::new(),
            include_schemas: None,
            exclude_schemas: Vec::new(),
            replace_invalid_characters: false,
            ignore_invalid_names: true,
        }
    }
}

impl DiscoverySettings {
    pub fn catalog_allowed(&self, catalog: &str) -> bool {
        allowed(catalog, self.include_catalogs.as_deref(), &self.exclude_catalogs)
    }

    pub fn schema_allowed(&self, schema: &str) -> bool {
        allowed(schema, self.include_schemas.as_deref(), &self.exclude_schemas)
    }
}

fn allowed(name: &str, include: Option<&[String]>, exclude: &[String]) -> bool {
    let raw = restore(name);
    let listed = |list: &[String]| list.iter().any(|entry| entry == name || *entry == raw);

    if listed(exclude) {
        return false;
    }
    include.map_or(true, listed)
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Read cached discovery results. When false every call re-queries the
    /// engine; results are still written.
    pub enabled: bool,

    /// Cache database file; the user cache directory when absent.
    pub path: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl CacheSettings {
    /// Configured cache file with environment variables and `~` expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let expanded = expand_env_vars(path)?;
        let resolved = match expanded.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .ok_or_else(|| SettingsError::InvalidConfig("no home directory".to_string()))?
                .join(rest),
            None => PathBuf::from(expanded),
        };
        Ok(Some(resolved))
    }
}

/// Query configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Row cap when a request has no `limit`.
    pub default_limit: i64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// Join detection configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JoinSettings {
    pub strategy: JoinStrategy,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CATALOGQL_CONFIG`
    /// 2. `./catalogql.toml`
    /// 3. `~/.config/catalogql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("catalogql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("catalogql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.query.default_limit < 0 {
            return Err(SettingsError::InvalidConfig(format!(
                "query.default_limit must not be negative, got {}",
                self.query.default_limit
            )));
        }
        if self.worker.timeout_seconds == 0 {
            return Err(SettingsError::InvalidConfig(
                "worker.timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Walker behavior derived from the discovery and cache sections.
    pub fn walker_options(&self) -> WalkerOptions {
        WalkerOptions {
            replace_invalid_characters: self.discovery.replace_invalid_characters,
            use_cache: self.cache.enabled,
        }
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// The connection named `default`, or the first one by name.
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections.iter().next().map(|(k, v)| (k.as_str(), v))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = std::iter::from_fn(|| chars.next_if(|ch| *ch != '}')).collect();
            chars.next_if_eq(&'}');
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_')).collect()
        };

        if var_name.is_empty() {
            result.push('$');
            continue;
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
