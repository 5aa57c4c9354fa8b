//! # Ingredient Extraction Seam
//!
//! The requirement list comes from an external language-model collaborator.
//! This module defines the contract that collaborator implements and the
//! bounded retry driver the calling layer uses around it.
//!
//! The engine itself never retries and never times out; the caller picks a
//! [`RetryPolicy`] and passes it in.
//!
//! The retry driver reports through `tracing`. With no subscriber installed,
//! its events are forwarded to the `log` facade (the `log` feature of
//! `tracing`), so `env_logger` shows them next to the rest of the engine.

use crate::requirements::RequirementList;
use rand::Rng;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Failure reported by an extraction collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// The collaborator could not be reached or refused the request
    #[error("Extraction service unavailable: {0}")]
    Unavailable(String),
    /// The collaborator answered with something that is not a requirement list
    #[error("Invalid extraction response: {0}")]
    InvalidResponse(String),
    /// The collaborator answered with an empty requirement list
    #[error("Extraction returned no ingredients")]
    Empty,
}

/// All attempts failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Extraction failed after {attempts} attempt(s): {last}")]
pub struct RetryError {
    pub attempts: u32,
    pub last: ExtractionError,
}

/// Something that turns a free-text request into a requirement list
pub trait IngredientExtractor {
    fn extract(
        &self,
        request: &str,
    ) -> impl Future<Output = Result<RequirementList, ExtractionError>> + Send;
}

/// Caller-owned retry policy for the extraction call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds
    pub base_delay_ms: u64,
    /// Upper bound on the delay between attempts in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000, // 1 second
            max_delay_ms: 10000, // 10 seconds
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately, mostly useful in tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay after failed attempt number `attempt` (1-based)
    ///
    /// `min(base * 2^(attempt - 1), max)` plus up to a quarter of that as random jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let capped = self
            .base_delay_ms
            .saturating_mul(1_u64 << exponent)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0..=capped / 4);
        Duration::from_millis(capped + jitter)
    }
}

/// Dish name and requirement list read from a collaborator's answer
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDish {
    /// Dish the collaborator recognised, when it names one
    pub dish: Option<String>,
    pub requirements: RequirementList,
}

/// Parse a collaborator's text answer into a dish and its requirement list
///
/// Two shapes are accepted: the bare ingredient mapping, and the same mapping
/// wrapped as `{"dish": "...", "ingredients": {...}}`. Markdown code fences
/// around the JSON are tolerated. An empty list is reported as
/// [`ExtractionError::Empty`].
///
/// # Examples
///
/// ```rust
/// use basket_engine::extraction::parse_extracted_dish;
///
/// let answer = r#"{"dish": "борщ", "ingredients": {"свекла": [700, "г"]}}"#;
/// let extracted = parse_extracted_dish(answer).unwrap();
/// assert_eq!(extracted.dish.as_deref(), Some("борщ"));
/// assert_eq!(extracted.requirements.as_slice()[0].name, "свекла");
/// ```
pub fn parse_extracted_dish(text: &str) -> Result<ExtractedDish, ExtractionError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let mut document: Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::InvalidResponse(format!("Response is not valid JSON: {e}")))?;

    let (dish, ingredients) = match document.as_object_mut() {
        Some(object) if object.contains_key("ingredients") => {
            let dish = object
                .get("dish")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            let ingredients = object.remove("ingredients").unwrap_or(Value::Null);
            (dish, ingredients)
        }
        _ => (None, document),
    };

    let requirements = RequirementList::from_value(ingredients)
        .map_err(|e| ExtractionError::InvalidResponse(format!("{e:#}")))?;

    if requirements.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(ExtractedDish { dish, requirements })
}

/// Parse a collaborator's text answer into a requirement list
///
/// Same accepted shapes as [`parse_extracted_dish`]; the dish name is dropped.
pub fn parse_extraction_response(text: &str) -> Result<RequirementList, ExtractionError> {
    parse_extracted_dish(text).map(|extracted| extracted.requirements)
}

/// Run the extractor until it yields a non-empty list or the attempts run out
pub async fn extract_with_retry<E: IngredientExtractor>(
    extractor: &E,
    request: &str,
    policy: &RetryPolicy,
) -> Result<RequirementList, RetryError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = match extractor.extract(request).await {
            Ok(list) if list.is_empty() => Err(ExtractionError::Empty),
            other => other,
        };

        match outcome {
            Ok(list) => {
                info!(attempt, ingredients = list.len(), "Ingredient extraction succeeded");
                return Ok(list);
            }
            Err(e) if attempt >= max_attempts => {
                error!(attempt, error = %e, "Ingredient extraction failed, giving up");
                return Err(RetryError { attempts: attempt, last: e });
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Ingredient extraction failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
