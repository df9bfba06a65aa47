//! Structured-text extraction: recover one JSON object from model output.
//!
//! Language models wrap JSON in prose, markdown fences, or both. All
//! structure recovery for model responses goes through
//! [`extract_structured_object`]; callers never parse model text directly.
//!
//! Strategies, in strict priority order:
//!
//! 1. A fence tagged as JSON (```` ```json ... ``` ````)
//! 2. The first plain fence (```` ``` ... ``` ````)
//! 3. The span from the first `{` to the last `}`
//! 4. The whole trimmed text
//!
//! A candidate that fails to parse falls through to the next strategy,
//! except a tagged JSON fence: a parse failure there fails the extraction.

use serde_json::{Map, Value};
use crate::error::Error;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Extract a single JSON object from free-form model text.
pub fn extract_structured_object(text: &str) -> Result<Map<String, Value>, Error> {
    let trimmed = text.trim();

    // 1) ```json fenced block: authoritative
    if let Some(block) = tagged_json_fence(trimmed) {
        return parse_object(block).map_err(|reason| Error::MalformedResponse {
            raw: text.to_string(),
            reason: format!("fenced ```json block did not contain a JSON object: {reason}"),
        });
    }

    // 2) Any ``` fenced block
    if let Some(block) = plain_fence(trimmed) {
        if let Ok(obj) = parse_object(block) {
            return Ok(obj);
        }
    }

    // 3) First '{' to last '}'
    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if last > first {
            if let Ok(obj) = parse_object(&trimmed[first..=last]) {
                return Ok(obj);
            }
        }
    }

    // 4) The whole text
    parse_object(trimmed).map_err(|reason| Error::MalformedResponse {
        raw: text.to_string(),
        reason: format!("no JSON object found: {reason}"),
    })
}

/// Contents of the first ```` ```json ```` fence, if it is closed.
fn tagged_json_fence(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let start = text.to_ascii_lowercase().find(JSON_FENCE)?;
    let body_start = start + JSON_FENCE.len();
    let end = body_start + text[body_start..].find(FENCE)?;
    Some(text[body_start..end].trim())
}

/// Contents of the first ```` ``` ```` fence pair, if any.
fn plain_fence(text: &str) -> Option<&str> {
    let start = text.find(FENCE)?;
    let body_start = start + FENCE.len();
    let end = body_start + text[body_start..].find(FENCE)?;
    Some(text[body_start..end].trim())
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err("top-level JSON value is not an object".into()),
        Err(e) => Err(e.to_string()),
    }
}
