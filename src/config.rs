//! Configuration management for the grammar-check service.
//!
//! Configuration can be set via environment variables:
//! - `OPENAI_API_KEY` - Required for the `openai` backend.
//! - `GRAMMAR_MODEL` - Optional. Model identifier. Defaults to `gpt-4o-mini`.
//! - `OPENAI_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `GRAMMAR_BACKEND` - Optional. `openai` (default) or `scripted`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `GRAMMAR_MAX_ATTEMPTS` - Optional. Upstream attempts per task. Defaults to `3`.
//! - `GRAMMAR_INITIAL_BACKOFF_MS` - Optional. First retry delay. Defaults to `1000`.
//! - `GRAMMAR_MAX_BACKOFF_MS` - Optional. Retry delay cap. Defaults to `30000`.
//! - `LLM_TIMEOUT_SECS` - Optional. Per-request timeout. Defaults to `60`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::grammar::RetryPolicy;
use crate::llm::{LlmClient, OpenAiClient, ScriptedClient};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// OpenAI-compatible HTTP endpoint
    OpenAi,
    /// In-process client answering `[]` to everything (no credentials needed)
    Scripted,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Backend::OpenAi),
            "scripted" => Ok(Backend::Scripted),
            other => Err(ConfigError::InvalidValue(
                "GRAMMAR_BACKEND".to_string(),
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,

    /// API key for the completion provider (empty for the scripted backend)
    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,

    pub base_url: String,

    pub host: String,

    pub port: u16,

    pub retry: RetryPolicy,

    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` is not set
    /// for the `openai` backend, and `ConfigError::InvalidValue` for values
    /// that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("GRAMMAR_BACKEND") {
            Some(value) => value.parse()?,
            None => Backend::OpenAi,
        };

        let api_key = match (backend, lookup("OPENAI_API_KEY")) {
            (_, Some(key)) if !key.trim().is_empty() => key,
            (Backend::Scripted, _) => String::new(),
            (Backend::OpenAi, _) => {
                return Err(ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
            }
        };

        let model = lookup("GRAMMAR_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let base_url = lookup("OPENAI_BASE_URL")
            .unwrap_or_else(|| crate::llm::DEFAULT_BASE_URL.to_string());
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "PORT", 8000)?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_var(&lookup, "GRAMMAR_MAX_ATTEMPTS", defaults.max_attempts)?,
            initial_backoff: Duration::from_millis(parse_var(
                &lookup,
                "GRAMMAR_INITIAL_BACKOFF_MS",
                1000,
            )?),
            max_backoff: Duration::from_millis(parse_var(
                &lookup,
                "GRAMMAR_MAX_BACKOFF_MS",
                30_000,
            )?),
            ..defaults
        };
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "GRAMMAR_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let request_timeout = Duration::from_secs(parse_var(&lookup, "LLM_TIMEOUT_SECS", 60)?);

        Ok(Self {
            backend,
            api_key,
            model,
            base_url,
            host,
            port,
            retry,
            request_timeout,
        })
    }

    /// Build the completion client this configuration describes.
    pub fn llm_client(&self) -> Arc<dyn LlmClient> {
        match self.backend {
            Backend::OpenAi => Arc::new(OpenAiClient::with_base_url(
                self.api_key.clone(),
                self.model.clone(),
                &self.base_url,
                self.request_timeout,
            )),
            Backend::Scripted => Arc::new(ScriptedClient::always("[]")),
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_with_api_key() {
        let config = Config::from_lookup(env(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.backend, Backend::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn api_key_required_for_openai() {
        let err = Config::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "OPENAI_API_KEY"));
    }

    #[test]
    fn scripted_backend_needs_no_key() {
        let config = Config::from_lookup(env(&[("GRAMMAR_BACKEND", "Scripted")])).unwrap();
        assert_eq!(config.backend, Backend::Scripted);
        assert!(config.api_key.is_empty());
        assert_eq!(config.llm_client().model(), "scripted");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "9090"),
            ("GRAMMAR_MAX_ATTEMPTS", "5"),
            ("GRAMMAR_INITIAL_BACKOFF_MS", "250"),
            ("GRAMMAR_MODEL", "gpt-4o"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.llm_client().model(), "gpt-4o");
    }

    #[test]
    fn invalid_values_are_reported() {
        let err =
            Config::from_lookup(env(&[("OPENAI_API_KEY", "k"), ("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "PORT"));

        let err = Config::from_lookup(env(&[
            ("OPENAI_API_KEY", "k"),
            ("GRAMMAR_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue(name, _) if name == "GRAMMAR_MAX_ATTEMPTS"
        ));

        assert!(Config::from_lookup(env(&[("GRAMMAR_BACKEND", "carrier-pigeon")])).is_err());
    }
}
