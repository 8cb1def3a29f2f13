//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the character API (e.g. "https://api.example.com")
    pub api_url: String,
    /// File holding the session token between runs
    pub token_path: PathBuf,
    /// Per-request timeout for API calls
    pub request_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            token_path: PathBuf::from(".sheet-keeper/token"),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("SHEET_API_URL").map_err(|_| ConfigError::Missing("SHEET_API_URL"))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid("SHEET_API_URL", api_url));
        }

        let request_timeout = match env::var("SHEET_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid("SHEET_REQUEST_TIMEOUT_SECS", raw))?,
            Err(_) => Duration::from_secs(15),
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_path: env::var("SHEET_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".sheet-keeper/token")),
            request_timeout,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("SHEET_API_URL", "https://api.example.com/");
        env::set_var("SHEET_REQUEST_TIMEOUT_SECS", "5");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
