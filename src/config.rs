//! AppConfig: loaded once at startup from environment variables.
//!
//! The binary calls `dotenvy::dotenv()` first, so a local `.env` file works
//! the same as exported variables.

use crate::error::AppError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_SESSION_FILE: &str = ".beeconnect/session.json";
pub const DEFAULT_NARROW_VIEWPORT_PX: u32 = 768;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub session_file: PathBuf,
    /// Viewports narrower than this collapse the sidebar after navigation.
    pub narrow_viewport_px: u32,
    pub http_timeout: Duration,
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            narrow_viewport_px: DEFAULT_NARROW_VIEWPORT_PX,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            api_url: lookup("BEECONNECT_API_URL").unwrap_or(defaults.api_url),
            session_file: lookup("BEECONNECT_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            narrow_viewport_px: env_parse(
                &lookup,
                "BEECONNECT_NARROW_VIEWPORT_PX",
                defaults.narrow_viewport_px,
            )?,
            http_timeout: Duration::from_secs(env_parse(
                &lookup,
                "BEECONNECT_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            page_size: env_parse(&lookup, "BEECONNECT_PAGE_SIZE", defaults.page_size)?,
        })
    }
}

fn env_parse<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a number, got '{raw}'"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BEECONNECT_API_URL", "https://api.example.org"),
            ("BEECONNECT_SESSION_FILE", "/tmp/s.json"),
            ("BEECONNECT_NARROW_VIEWPORT_PX", "992"),
            ("BEECONNECT_HTTP_TIMEOUT_SECS", " 5 "),
            ("BEECONNECT_PAGE_SIZE", "25"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.org");
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.narrow_viewport_px, 992);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn rejects_non_numeric() {
        let err = AppConfig::from_lookup(lookup_from(&[("BEECONNECT_PAGE_SIZE", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("BEECONNECT_PAGE_SIZE"));
    }
}
