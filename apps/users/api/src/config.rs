use core_config::{
    app_info, env_optional, env_or_default, server::ServerConfig, AppInfo, ConfigError, FromEnv,
};
use database::postgres::PostgresConfig;
use std::path::PathBuf;
use std::str::FromStr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Where users are stored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres),
            other => Err(format!(
                "unknown storage backend '{}', expected memory or postgres",
                other
            )),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `core_config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub storage: StorageBackend,
    /// Set only for the postgres backend
    pub database: Option<PostgresConfig>,
    /// Append-only request log, written when set
    pub request_log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080

        let storage: StorageBackend = env_or_default("STORAGE_BACKEND", "memory")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "STORAGE_BACKEND".to_string(),
                details,
            })?;

        let database = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?), // Requires DATABASE_URL
            StorageBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            storage,
            database,
            request_log_file: env_optional("REQUEST_LOG_FILE").map(PathBuf::from),
        })
    }
}
