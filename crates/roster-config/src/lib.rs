//! # Roster Config
//!
//! Configuration values for the Roster API, read once at startup and then
//! passed explicitly to whatever needs them.
//!
//! - [`database`]: connection string and pool sizing
//! - [`server`]: bind address and storage backend
//! - [`cors`]: allowed origins
//! - [`logging`]: log level and optional log directory
//!
//! Each type has a `from_env()` constructor and a `from_lookup()` variant that
//! takes any key lookup, which keeps the parsing testable without touching the
//! process environment.
//!
//! # Example
//!
//! ```ignore
//! use roster_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env();
//! println!("listening on {}", config.server.bind_address());
//! ```

pub mod cors;
pub mod database;
pub mod logging;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use logging::LogConfig;
pub use server::{ServerConfig, StoreBackend};

/// Parses `key` via `lookup`, falling back to `default` when the variable is
/// missing or malformed.
pub(crate) fn parsed_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// All configuration for one process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads every section from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database: DatabaseConfig::from_lookup(&lookup),
            server: ServerConfig::from_lookup(&lookup),
            cors: CorsConfig::from_lookup(&lookup),
            log: LogConfig::from_lookup(&lookup),
        }
    }
}
