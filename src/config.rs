use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// PostgreSQL URL. When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    /// Pool size (default: `5`).
    pub database_max_connections: u32,
    /// Refuse check-out when no copy is available (default: `true`).
    pub enforce_inventory: bool,
    /// How often the movie cache is re-warmed (default: 600 seconds).
    pub cache_refresh: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            database_url: None,
            database_max_connections: 5,
            enforce_inventory: true,
            cache_refresh: Duration::from_secs(600),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {value:?}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default   |
    /// |----------------------------|-----------|
    /// | `HOST`                     | `0.0.0.0` |
    /// | `PORT`                     | `3000`    |
    /// | `DATABASE_URL`             | unset     |
    /// | `DATABASE_MAX_CONNECTIONS` | `5`       |
    /// | `ENFORCE_INVENTORY`        | `true`    |
    /// | `CACHE_REFRESH_SECS`       | `600`     |
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
            database_url,
            database_max_connections: env_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            enforce_inventory: env_or("ENFORCE_INVENTORY", defaults.enforce_inventory)?,
            cache_refresh: Duration::from_secs(env_or(
                "CACHE_REFRESH_SECS",
                defaults.cache_refresh.as_secs(),
            )?),
        })
    }
}
