//! Configuration module for loading environment variables and settings.

use crate::error::ConfigError;

/// Default base URL for the OpenAI API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Application configuration loaded from environment variables.
///
/// Loaded lazily on the first tool invocation rather than at startup,
/// so a missing API key is reported through a tool error instead of
/// killing the protocol connection.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key (required)
    pub api_key: String,
    /// Base URL for the OpenAI API
    pub api_base: String,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if OPENAI_API_KEY is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "OPENAI_API_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let api_base = std::env::var("OPENAI_API_BASE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self { api_key, api_base })
    }
}
