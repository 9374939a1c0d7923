//! Logging settings.
//!
//! # Environment Variables
//!
//! - `LOG_LEVEL`: level for this application's own targets (default: `info`)
//! - `LOG_DIR`: when set, daily-rolling log files are written here
//! - `LOG_JSON`: emit console output as JSON lines (default: false)

use std::path::PathBuf;

use crate::parsed_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            json: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: lookup("LOG_LEVEL")
                .map(|v| v.trim().to_ascii_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "info".to_string()),
            directory: lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            json: parsed_or(lookup, "LOG_JSON", false),
        }
    }

    /// Default `EnvFilter` directives when `RUST_LOG` is not set.
    pub fn default_directives(&self, crate_name: &str) -> String {
        format!(
            "{}={},tower_http=warn,hyper=warn,sqlx=warn",
            crate_name, self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let config = LogConfig::default();
        assert_eq!(
            config.default_directives("roster"),
            "roster=info,tower_http=warn,hyper=warn,sqlx=warn"
        );
    }

    #[test]
    fn test_from_lookup() {
        let config = LogConfig::from_lookup(&|key: &str| match key {
            "LOG_LEVEL" => Some(" DEBUG ".to_string()),
            "LOG_DIR" => Some("storage/logs".to_string()),
            _ => None,
        });
        assert_eq!(config.level, "debug");
        assert_eq!(config.directory, Some(PathBuf::from("storage/logs")));
        assert!(!config.json);
    }
}
