//! # Engine Configuration Module
//!
//! This module defines the runtime configuration of the basket engine and
//! reads it from the environment (a `.env` file is honoured when present).
//!
//! | Variable                    | Meaning                                   | Default |
//! |-----------------------------|-------------------------------------------|---------|
//! | `BASKET_TOKEN_SLACK`        | name token slack, `none` for unbounded    | 3       |
//! | `BASKET_CATALOG_PATH`       | catalog snapshot JSON file                | unset   |
//! | `EXTRACTION_MAX_ATTEMPTS`   | extraction attempts including the first   | 3       |
//! | `EXTRACTION_BASE_DELAY_MS`  | delay before the second attempt           | 1000    |
//! | `EXTRACTION_MAX_DELAY_MS`   | delay cap between attempts                | 10000   |

use crate::extraction::RetryPolicy;
use crate::matcher::{MatchPolicy, DEFAULT_TOKEN_SLACK};
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const TOKEN_SLACK_VAR: &str = "BASKET_TOKEN_SLACK";
pub const CATALOG_PATH_VAR: &str = "BASKET_CATALOG_PATH";
pub const MAX_ATTEMPTS_VAR: &str = "EXTRACTION_MAX_ATTEMPTS";
pub const BASE_DELAY_VAR: &str = "EXTRACTION_BASE_DELAY_MS";
pub const MAX_DELAY_VAR: &str = "EXTRACTION_MAX_DELAY_MS";

/// Configuration of the engine and of the extraction retry policy
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Name matching policy
    pub match_policy: MatchPolicy,
    /// Where the catalog snapshot is read from
    pub catalog_path: Option<PathBuf>,
    /// Retry policy the calling layer applies to the extraction call
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::default(),
            catalog_path: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load `.env` if present, then read the configuration from the process environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok());
        info!(
            "Engine configuration: token slack {:?}, catalog {:?}, {} extraction attempts",
            config.match_policy.max_token_slack,
            config.catalog_path,
            config.retry.max_attempts
        );
        config
    }

    /// Read the configuration through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_token_slack = match lookup(TOKEN_SLACK_VAR) {
            None => Some(DEFAULT_TOKEN_SLACK),
            Some(value) if matches!(value.trim().to_lowercase().as_str(), "none" | "unbounded") => None,
            Some(value) => Some(parse_or_default(TOKEN_SLACK_VAR, &value, DEFAULT_TOKEN_SLACK)),
        };

        let retry = RetryPolicy {
            max_attempts: lookup(MAX_ATTEMPTS_VAR)
                .map(|v| parse_or_default(MAX_ATTEMPTS_VAR, &v, defaults.retry.max_attempts))
                .unwrap_or(defaults.retry.max_attempts),
            base_delay_ms: lookup(BASE_DELAY_VAR)
                .map(|v| parse_or_default(BASE_DELAY_VAR, &v, defaults.retry.base_delay_ms))
                .unwrap_or(defaults.retry.base_delay_ms),
            max_delay_ms: lookup(MAX_DELAY_VAR)
                .map(|v| parse_or_default(MAX_DELAY_VAR, &v, defaults.retry.max_delay_ms))
                .unwrap_or(defaults.retry.max_delay_ms),
        };

        Self {
            match_policy: MatchPolicy { max_token_slack },
            catalog_path: lookup(CATALOG_PATH_VAR)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            retry,
        }
    }
}

fn parse_or_default<T: FromStr + Copy + std::fmt::Debug>(key: &str, value: &str, default: T) -> T {
    value.trim().parse().unwrap_or_else(|_| {
        warn!("Invalid value '{}' for {}, using {:?}", value, key, default);
        default
    })
}
