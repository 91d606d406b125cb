//! Data models for consultations and categorization

use serde::{Deserialize, Serialize};

/// Outcome of a spending consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Approve,
    Warn,
    Decline,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Warn => "warn",
            Self::Decline => "decline",
        }
    }

    /// Risk level shown alongside the recommendation
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Self::Approve => RiskLevel::Low,
            Self::Warn => RiskLevel::Medium,
            Self::Decline => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Which path produced a piece of advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    /// The AI backend replied and its text was interpreted
    Model,
    /// Deterministic local policy (backend missing, failed or timed out)
    Fallback,
}

/// A proposed purchase the user wants advice on
///
/// Callers validate `amount > 0` and a non-empty description before
/// building one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub amount: f64,
    pub category: String,
    pub description: String,
}

impl ConsultationRequest {
    pub fn new(amount: f64, category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            description: description.into(),
        }
    }
}

/// Advice returned for a single consultation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationResult {
    pub recommendation: Recommendation,
    pub message: String,
    /// At most three suggestions
    pub alternatives: Vec<String>,
    pub impact_analysis: String,
    pub risk_level: RiskLevel,
    pub source: AdviceSource,
}

/// Category and necessity assigned to a transaction description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationResult {
    pub category: String,
    /// 1 = luxury, 10 = essential
    pub necessity_score: u8,
    /// In (0, 1]
    pub confidence: f64,
}

impl CategorizationResult {
    /// Necessity on the 1-5 scale used for user-defined categories
    pub fn necessity_level(&self) -> u8 {
        ((self.necessity_score as f64) / 2.0).round().clamp(1.0, 5.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_mapping() {
        assert_eq!(Recommendation::Approve.risk_level(), RiskLevel::Low);
        assert_eq!(Recommendation::Warn.risk_level(), RiskLevel::Medium);
        assert_eq!(Recommendation::Decline.risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_recommendation_serializes_lowercase() {
        let json = serde_json::to_string(&Recommendation::Decline).unwrap();
        assert_eq!(json, "\"decline\"");
    }

    #[test]
    fn test_consultation_result_camel_case() {
        let result = ConsultationResult {
            recommendation: Recommendation::Warn,
            message: "Careful".to_string(),
            alternatives: vec!["Consider postponing".to_string()],
            impact_analysis: "Impact".to_string(),
            risk_level: RiskLevel::Medium,
            source: AdviceSource::Fallback,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["impactAnalysis"], "Impact");
        assert_eq!(json["riskLevel"], "medium");
        assert_eq!(json["source"], "fallback");
    }

    #[test]
    fn test_necessity_level() {
        let mut result = CategorizationResult {
            category: "Bills".to_string(),
            necessity_score: 9,
            confidence: 0.7,
        };
        assert_eq!(result.necessity_level(), 5);

        result.necessity_score = 2;
        assert_eq!(result.necessity_level(), 1);

        result.necessity_score = 1;
        assert_eq!(result.necessity_level(), 1);

        result.necessity_score = 7;
        assert_eq!(result.necessity_level(), 4);
    }
}
