//! Settings read from the environment.

use std::env;
use std::time::Duration;

use thiserror::Error;
use trip_planner_core::RetryPolicy;
use trip_planner_gemini_model::{GeminiConfig, GeminiConfigBuilder};

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const MODEL_VAR: &str = "GEMINI_MODEL";
const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
const RATE_LIMIT_DELAY_VAR: &str = "RATE_LIMIT_DELAY";
const MAX_RETRIES_VAR: &str = "MAX_RETRIES";
const INITIAL_RETRY_DELAY_VAR: &str = "INITIAL_RETRY_DELAY";

const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for every delay setting.
const MAX_DELAY_SECS: f64 = 3600.0;

/// An error in the environment configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key is unset or empty.
    #[error("GEMINI_API_KEY is not set, add it to the environment or a .env file")]
    MissingApiKey,
    /// A variable holds a value that cannot be used.
    #[error("invalid value `{value}` for {name}: {reason}")]
    Invalid {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// What was expected instead.
        reason: &'static str,
    },
}

/// Everything the CLI needs to build a session.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Gemini API key.
    pub api_key: String,
    /// Model name, if overridden.
    pub model: Option<String>,
    /// API base URL, if overridden.
    pub base_url: Option<String>,
    /// Minimum time between two model calls.
    pub rate_limit_delay: Duration,
    /// Retry behavior for rate-limited model calls.
    pub retry_policy: RetryPolicy,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value
    /// of a variable if it is set. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = var(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;

        let defaults = RetryPolicy::default();
        let rate_limit_delay = match var(RATE_LIMIT_DELAY_VAR) {
            Some(value) => parse_seconds(RATE_LIMIT_DELAY_VAR, value)?,
            None => DEFAULT_RATE_LIMIT_DELAY,
        };
        let max_retries = match var(MAX_RETRIES_VAR) {
            Some(value) => parse_count(MAX_RETRIES_VAR, value)?,
            None => defaults.max_retries,
        };
        let initial_delay = match var(INITIAL_RETRY_DELAY_VAR) {
            Some(value) => parse_seconds(INITIAL_RETRY_DELAY_VAR, value)?,
            None => defaults.initial_delay,
        };

        Ok(Self {
            api_key,
            model: var(MODEL_VAR),
            base_url: var(BASE_URL_VAR),
            rate_limit_delay,
            retry_policy: RetryPolicy {
                max_retries,
                initial_delay,
            },
        })
    }

    /// Builds the provider configuration.
    pub fn gemini_config(&self) -> GeminiConfig {
        let mut builder = GeminiConfigBuilder::with_api_key(&self.api_key);
        if let Some(model) = &self.model {
            builder = builder.with_model(model);
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }
}

fn parse_seconds(
    name: &'static str,
    value: String,
) -> Result<Duration, ConfigError> {
    let seconds = value
        .parse::<f64>()
        .ok()
        .filter(|seconds| *seconds <= MAX_DELAY_SECS);
    match seconds.and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    {
        Some(duration) => Ok(duration),
        None => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected a number of seconds between 0 and 3600",
        }),
    }
}

fn parse_count(name: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.parse() {
        Ok(count) => Ok(count),
        Err(_) => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected a non-negative integer",
        }),
    }
}
