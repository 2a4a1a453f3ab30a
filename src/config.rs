//! Configuration management.
//!
//! Configuration is read from environment variables:
//! - `OPENROUTER_API_KEY` - Required. API key for the LLM provider.
//! - `OPENROUTER_API_URL` - Optional. Chat-completions endpoint override.
//! - `DEFAULT_MODEL` - Optional. Model used for extraction and summaries.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature sent with each request.
//! - `FILE_CONCURRENCY` - Optional. Collaborator calls in flight per phase. Defaults to 1.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.

use std::env;

use thiserror::Error;

use crate::llm::OPENROUTER_API_URL;

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM provider API key
    pub api_key: String,

    /// Chat-completions endpoint
    pub api_url: String,

    /// Model id for both collaborators
    pub default_model: String,

    /// Sampling temperature, provider default when unset
    pub temperature: Option<f64>,

    /// Collaborator calls allowed in flight within one phase
    pub file_concurrency: usize,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set,
    /// or `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let api_url =
            lookup("OPENROUTER_API_URL").unwrap_or_else(|| OPENROUTER_API_URL.to_string());

        let default_model =
            lookup("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = lookup("LLM_TEMPERATURE")
            .map(|v| {
                v.parse::<f64>().map_err(|e| {
                    ConfigError::InvalidValue("LLM_TEMPERATURE".to_string(), format!("{}", e))
                })
            })
            .transpose()?;

        let file_concurrency = lookup("FILE_CONCURRENCY")
            .map(|v| {
                v.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidValue("FILE_CONCURRENCY".to_string(), format!("{}", e))
                })
            })
            .transpose()?
            .unwrap_or(1)
            .max(1);

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        Ok(Self {
            api_key,
            api_url,
            default_model,
            temperature,
            file_concurrency,
            host,
            port,
        })
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
