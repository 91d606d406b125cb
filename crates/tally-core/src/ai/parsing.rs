//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in extra prose, so these helpers look for
//! the outermost object in the reply before deserializing it.

use crate::error::{Error, Result};
use crate::models::CategorizationResult;

use super::types::ModelCategorization;

/// Slice out the first `{ ... }` span of a reply
fn json_object(response: &str) -> Option<&str> {
    let response = response.trim();
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

fn truncated(s: &str) -> String {
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Parse a categorization reply.
///
/// Rejects replies whose necessity score is outside 1-10 or whose confidence
/// is outside (0, 1]; a missing confidence defaults to `default_confidence`.
pub fn parse_categorization(
    response: &str,
    default_confidence: f64,
) -> Result<CategorizationResult> {
    let json_str = json_object(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No JSON found in AI categorization response | Raw: {}",
            truncated(response)
        ))
    })?;

    let raw: ModelCategorization = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid categorization JSON from AI: {} | Raw: {}",
            e,
            truncated(json_str)
        ))
    })?;

    let category = raw.category.trim();
    if category.is_empty() {
        return Err(Error::InvalidData("AI returned an empty category".into()));
    }

    let score = raw.necessity_score.round();
    if !(1.0..=10.0).contains(&score) {
        return Err(Error::InvalidData(format!(
            "Necessity score out of range: {}",
            raw.necessity_score
        )));
    }

    let confidence = raw.confidence.unwrap_or(default_confidence);
    if !(confidence > 0.0 && confidence <= 1.0) {
        return Err(Error::InvalidData(format!(
            "Confidence out of range: {}",
            confidence
        )));
    }

    Ok(CategorizationResult {
        category: category.to_string(),
        necessity_score: score as u8,
        confidence,
    })
}
