//! Application configuration

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::core::DEFAULT_MESSAGE_TTL;

/// The only origin browsers may call the API from
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub provider_timeout_secs: u64,
    pub redis_url: String,
    pub message_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000),
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4-turbo-preview".into()),
            openai_temperature: lookup("OPENAI_TEMPERATURE")
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.7),
            provider_timeout_secs: lookup("PROVIDER_TIMEOUT_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| "redis://localhost:6379".into()),
            message_ttl: lookup("THREAD_TTL_SECS")
                .and_then(|t| t.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_MESSAGE_TTL),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err.to_string(), "OPENAI_API_KEY environment variable is not set");

        assert!(Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "")])).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.port, 8000);
        assert_eq!(config.openai_model, "gpt-4-turbo-preview");
        assert_eq!(config.message_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("REDIS_URL", "redis://cache:6380/2"),
            ("PORT", "not-a-port"),
            ("THREAD_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.redis_url, "redis://cache:6380/2");
        assert_eq!(config.port, 8000);
        assert_eq!(config.message_ttl, Duration::from_secs(60));
    }
}
