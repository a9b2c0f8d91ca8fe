//! Configuration: TOML settings and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CacheSettings, ConnectionSettings, DiscoverySettings, JoinSettings,
    PoolSettings, QuerySettings, Settings, SettingsError, WorkerSettings, CONFIG_ENV_VAR,
};
