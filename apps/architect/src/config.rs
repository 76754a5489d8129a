use std::time::Duration;

use crate::errors::GatewayError;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OUTPUT_LANGUAGE: &str = "Simplified Chinese";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration loaded from environment variables.
/// A missing credential is a fatal configuration error, raised before any request.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub request_timeout: Duration,
    /// Language the generated persona, topics and reports are written in.
    pub output_language: String,
    /// Level this crate logs at when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_key = require_env("GEMINI_API_KEY").or_else(|_| require_env("API_KEY"))?;

        let request_timeout = match std::env::var("GEMINI_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                GatewayError::Configuration(format!(
                    "GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            api_key,
            api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            request_timeout,
            output_language: std::env::var("THESIS_OUTPUT_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_LANGUAGE.to_string()),
            log_level: std::env::var("THESIS_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Builds a configuration with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_language: DEFAULT_OUTPUT_LANGUAGE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_output_language(mut self, language: impl Into<String>) -> Self {
        self.output_language = language.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

fn require_env(key: &str) -> Result<String, GatewayError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GatewayError::Configuration(format!(
            "Required environment variable '{key}' is not set"
        ))),
    }
}
