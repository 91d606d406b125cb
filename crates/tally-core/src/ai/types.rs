//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// A single text-generation call: persona, user content and sampling budget
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System persona (omitted for terse tasks like categorization)
    pub system: Option<String>,
    /// User message
    pub user: String,
    /// Maximum number of tokens the model may generate
    pub max_tokens: u32,
    /// Sampling temperature (lower = more consistent)
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
            max_tokens: 400,
            temperature: 0.7,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        let system = system.into();
        self.system = if system.trim().is_empty() {
            None
        } else {
            Some(system)
        };
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Structured categorization a model may return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCategorization {
    pub category: String,
    pub necessity_score: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}
