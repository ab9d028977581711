//! Service configuration.
//!
//! Values come from `PLANTS_*` environment variables with local defaults. When
//! `PLANTS_CONFIG` names a YAML file, any keys it sets override the environment.
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BIND: &str = "127.0.0.1:5555";
pub const DEFAULT_METRICS_BIND: &str = "127.0.0.1:9555";
pub const DEFAULT_SQLITE_URL: &str = "sqlite://plants.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

/// Connection settings shared by the SQL backends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_ms() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_MS
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    /// `None` only when no URL was configured for a backend without a default.
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct ServiceConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<StorageBackend>,
    database: Option<DatabaseConfig>,
}

/// Pool sizing from `PLANTS_DB_*`, applied to the env URL and to the SQLite default.
#[derive(Debug, Clone, Copy)]
struct PoolSettings {
    max_connections: u32,
    acquire_timeout_ms: u64,
}

impl PoolSettings {
    fn from_env() -> Result<Self> {
        let max_connections = env_or(
            "PLANTS_DB_MAX_CONNECTIONS",
            &DEFAULT_MAX_CONNECTIONS.to_string(),
        )
        .parse()
        .with_context(|| "parse PLANTS_DB_MAX_CONNECTIONS")?;
        let acquire_timeout_ms = env_or(
            "PLANTS_DB_ACQUIRE_TIMEOUT_MS",
            &DEFAULT_ACQUIRE_TIMEOUT_MS.to_string(),
        )
        .parse()
        .with_context(|| "parse PLANTS_DB_ACQUIRE_TIMEOUT_MS")?;
        Ok(Self {
            max_connections,
            acquire_timeout_ms,
        })
    }

    fn database(self, url: String) -> DatabaseConfig {
        DatabaseConfig {
            url,
            max_connections: self.max_connections,
            acquire_timeout_ms: self.acquire_timeout_ms,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let pool = PoolSettings::from_env()?;
        let mut config = Self::env_layer(pool)?;
        config.apply_storage_defaults(pool);
        Ok(config)
    }

    /// Environment first, then the `PLANTS_CONFIG` YAML file, then backend defaults.
    pub fn from_env_or_yaml() -> Result<Self> {
        let pool = PoolSettings::from_env()?;
        let mut config = Self::env_layer(pool)?;
        if let Ok(path) = std::env::var("PLANTS_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read PLANTS_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        config.apply_storage_defaults(pool);
        Ok(config)
    }

    fn env_layer(pool: PoolSettings) -> Result<Self> {
        let bind_addr = env_or("PLANTS_BIND", DEFAULT_BIND)
            .parse()
            .with_context(|| "parse PLANTS_BIND")?;
        let metrics_bind = env_or("PLANTS_METRICS_BIND", DEFAULT_METRICS_BIND)
            .parse()
            .with_context(|| "parse PLANTS_METRICS_BIND")?;
        let storage = env_or("PLANTS_STORAGE_BACKEND", "sqlite")
            .parse()
            .with_context(|| "parse PLANTS_STORAGE_BACKEND")?;
        let database = std::env::var("PLANTS_DATABASE_URL")
            .ok()
            .map(|url| pool.database(url));
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            database,
        })
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: ServiceConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse plants config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.storage {
            self.storage = value;
        }
        if let Some(value) = override_cfg.database {
            self.database = Some(value);
        }
        Ok(())
    }

    // SQLite falls back to a file in the working directory; Postgres has no default.
    fn apply_storage_defaults(&mut self, pool: PoolSettings) {
        if self.storage == StorageBackend::Sqlite && self.database.is_none() {
            self.database = Some(pool.database(DEFAULT_SQLITE_URL.to_string()));
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
