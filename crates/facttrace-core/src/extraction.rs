//! Structured-response parsing.
//!
//! Models often wrap JSON in markdown fences or add stray prose. This module
//! strips the fences and parses what is left. Retrying with a corrective
//! prompt is the runtime's job; the helpers here are pure.

use serde_json::Value;
use thiserror::Error;

/// Appended to the original user prompt after a parse failure.
pub const CORRECTIVE_SUFFIX: &str =
    "\n\nERROR: Previous response was not valid JSON. Return ONLY valid JSON.";

/// Errors from parsing a model response as a structured object.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Response is empty")]
    Empty,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Remove a leading ```json or ``` fence and a trailing ``` fence.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse a model response as a JSON object.
pub fn parse_structured(raw: &str) -> Result<Value, ExtractionError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Array(_) => Err(ExtractionError::NotAnObject("array")),
        Value::String(_) => Err(ExtractionError::NotAnObject("string")),
        Value::Number(_) => Err(ExtractionError::NotAnObject("number")),
        Value::Bool(_) => Err(ExtractionError::NotAnObject("boolean")),
        Value::Null => Err(ExtractionError::NotAnObject("null")),
    }
}

/// The original prompt with the corrective instruction appended.
///
/// Always built from the original, so retries never stack suffixes.
pub fn corrective_prompt(original: &str) -> String {
    format!("{}{}", original, CORRECTIVE_SUFFIX)
}
