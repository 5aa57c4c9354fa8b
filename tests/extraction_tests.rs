//! # Extraction Retry Tests
//!
//! Bounded retries around a scripted extraction collaborator, including the
//! wrapped dish answer shape.

use anyhow::Result;
use basket_engine::extraction::{
    extract_with_retry, parse_extraction_response, ExtractionError, IngredientExtractor, RetryPolicy,
};
use basket_engine::requirements::RequirementList;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Extractor that replays scripted answers, one per call
struct ScriptedExtractor {
    answers: Mutex<Vec<Result<String, ExtractionError>>>,
    calls: AtomicU32,
}

impl ScriptedExtractor {
    fn new(answers: Vec<Result<&str, ExtractionError>>) -> Self {
        let mut answers: Vec<_> = answers
            .into_iter()
            .map(|a| a.map(str::to_string))
            .collect();
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IngredientExtractor for ScriptedExtractor {
    async fn extract(&self, _request: &str) -> Result<RequirementList, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(ExtractionError::Unavailable("script exhausted".to_string())));
        parse_extraction_response(&answer?)
    }
}

#[tokio::test]
async fn test_first_success_is_returned() -> Result<()> {
    let extractor = ScriptedExtractor::new(vec![Ok(r#"{"соль": [70, "г"]}"#)]);

    let list = extract_with_retry(&extractor, "борщ на 7 человек", &RetryPolicy::immediate(3)).await?;

    assert_eq!(list.len(), 1);
    assert_eq!(extractor.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_retries_until_success() -> Result<()> {
    let extractor = ScriptedExtractor::new(vec![
        Err(ExtractionError::Unavailable("timeout".to_string())),
        Ok("sorry, I cannot help"),
        Ok(r#"{"морковь": [700, "г"], "лук репчатый": [700, "г"]}"#),
    ]);

    let list = extract_with_retry(&extractor, "борщ", &RetryPolicy::immediate(3)).await?;

    assert_eq!(list.len(), 2);
    assert_eq!(list.as_slice()[1].name, "лук репчатый");
    assert_eq!(extractor.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_wrapped_dish_answer_succeeds_first_time() -> Result<()> {
    let extractor = ScriptedExtractor::new(vec![Ok(
        r#"{"dish": "Борщ", "ingredients": {"свекла": [700, "г"], "соль": [70, "г"]}}"#,
    )]);

    let list = extract_with_retry(&extractor, "борщ", &RetryPolicy::immediate(3)).await?;

    assert_eq!(list.len(), 2);
    assert_eq!(list.as_slice()[0].name, "свекла");
    assert_eq!(extractor.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let extractor = ScriptedExtractor::new(vec![
        Ok("{}"),
        Err(ExtractionError::Unavailable("rate limited".to_string())),
        Ok(r#"{"соль": [70, "г"]}"#),
    ]);

    let err = extract_with_retry(&extractor, "борщ", &RetryPolicy::immediate(2))
        .await
        .unwrap_err();

    assert_eq!(err.attempts, 2);
    assert_eq!(err.last, ExtractionError::Unavailable("rate limited".to_string()));
    assert_eq!(extractor.calls(), 2);
}

#[tokio::test]
async fn test_zero_attempts_still_tries_once() {
    let extractor = ScriptedExtractor::new(vec![Ok("{}")]);

    let err = extract_with_retry(&extractor, "", &RetryPolicy::immediate(0))
        .await
        .unwrap_err();

    assert_eq!(err.attempts, 1);
    assert_eq!(err.last, ExtractionError::Empty);
}
