use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{ExtractionStrategy, ValidationResult, ValidationStatus};

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 15;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewError {
    #[error("Model reply contains no JSON object")]
    NoJson,

    #[error("Model reply is not valid: {0}")]
    Malformed(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Pull the JSON object out of a model reply.
///
/// Accepts a bare object, one wrapped in a markdown fence, or one
/// surrounded by commentary. Returns the text from the first `{` to the
/// matching closing brace.
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in response[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse<T: DeserializeOwned>(response: &str) -> Result<T, ReviewError> {
    let json = extract_json(response).ok_or(ReviewError::NoJson)?;
    serde_json::from_str(json).map_err(|e| ReviewError::Malformed(e.to_string()))
}

fn check_confidence(value: f64) -> Result<(), ReviewError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ReviewError::OutOfRange {
            field: "confidence",
            value: value.to_string(),
        })
    }
}

fn check_level(field: &'static str, value: u32) -> Result<(), ReviewError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        Ok(())
    } else {
        Err(ReviewError::OutOfRange {
            field,
            value: value.to_string(),
        })
    }
}

pub fn parse_validation(response: &str) -> Result<ValidationResult, ReviewError> {
    let mut result: ValidationResult = parse(response)?;
    check_confidence(result.confidence)?;
    if let Some(level) = result.suggested_level {
        check_level("suggested_level", level)?;
    }
    if result.status != ValidationStatus::TryLevel && result.suggested_level.is_some() {
        log::debug!("dropping suggested level from a {} verdict", result.status);
        result.suggested_level = None;
    }
    Ok(result)
}

pub fn parse_strategy(response: &str) -> Result<ExtractionStrategy, ReviewError> {
    let strategy: ExtractionStrategy = parse(response)?;
    check_confidence(strategy.primary_strategy.confidence)?;
    check_level("target_level", strategy.primary_strategy.target_level)?;
    Ok(strategy)
}
