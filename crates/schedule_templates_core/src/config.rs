//! Runtime configuration for template storage and export.
//!
//! # Responsibility
//! - Collect the asset base URL, store location, fetch timeout and log level.
//! - Read overrides from `SCHEDULE_TEMPLATES_*` environment variables.
//!
//! # Invariants
//! - `asset_base_url` always ends with `/` so relative locators join under it.
//! - No fetch timeout is applied unless one is configured.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use url::Url;

pub const ENV_BASE_URL: &str = "SCHEDULE_TEMPLATES_BASE_URL";
pub const ENV_DB_PATH: &str = "SCHEDULE_TEMPLATES_DB";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "SCHEDULE_TEMPLATES_FETCH_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "SCHEDULE_TEMPLATES_LOG_LEVEL";

const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
const DEFAULT_DB_FILE_NAME: &str = "schedule_templates.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by the store, the export resolver and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Base that built-in `file_url` locators are resolved against.
    pub asset_base_url: Url,
    /// SQLite file holding custom templates and the active pointer.
    pub db_path: PathBuf,
    /// Optional client-side timeout for built-in fetches.
    pub fetch_timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            asset_base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default base url"),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            fetch_timeout_secs: None,
            log_level: default_log_level().to_string(),
        }
    }
}

impl TemplateConfig {
    /// Builds configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_BASE_URL) {
            config.asset_base_url = parse_base_url(ENV_BASE_URL, value.trim())?;
        }
        if let Some(value) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(value.trim());
        }
        if let Some(value) = get(ENV_FETCH_TIMEOUT_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|err| ConfigError::InvalidValue {
                    key: ENV_FETCH_TIMEOUT_SECS,
                    value: value.clone(),
                    reason: err.to_string(),
                })?;
            config.fetch_timeout_secs = Some(secs);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            config.log_level = value.trim().to_string();
        }

        Ok(config)
    }
}

/// Parses a base URL and appends a trailing slash when missing.
pub fn parse_base_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalized).map_err(|err| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        parse_base_url, TemplateConfig, ENV_BASE_URL, ENV_DB_PATH, ENV_FETCH_TIMEOUT_SECS,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = TemplateConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, TemplateConfig::default());
        assert_eq!(config.fetch_timeout_secs, None);
        assert!(config.asset_base_url.as_str().ends_with('/'));
    }

    #[test]
    fn overrides_are_read_from_lookup() {
        let config = TemplateConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://school.example/app"),
            (ENV_DB_PATH, "/var/lib/templates.db"),
            (ENV_FETCH_TIMEOUT_SECS, "30"),
        ]))
        .unwrap();

        assert_eq!(config.asset_base_url.as_str(), "https://school.example/app/");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/templates.db"));
        assert_eq!(config.fetch_timeout_secs, Some(30));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = TemplateConfig::from_lookup(lookup_from(&[(ENV_FETCH_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_FETCH_TIMEOUT_SECS));
    }

    #[test]
    fn base_url_must_be_absolute() {
        assert!(parse_base_url(ENV_BASE_URL, "templates").is_err());
    }
}
