//! Recommendation policy
//!
//! The deterministic decision function behind every consultation. It runs in
//! one of two modes:
//!
//! - **Fallback** (no model reply): compare the purchase with what is left of
//!   today's budget.
//! - **Model-assisted** (a reply is available): let the reply interpreter speak
//!   first, then fall through to a strictness-weighted check against the daily
//!   limit when the reply states no decision.
//!
//! All cutoffs live in [`PolicyThresholds`] and can be overridden from the
//! advisor config file.

use std::sync::Arc;

use crate::impact::ImpactEstimate;
use crate::models::Recommendation;
use crate::signal::{KeywordInterpreter, ReplyInterpreter};

/// Tunable cutoffs for the policy
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyThresholds {
    /// Fallback: warn above this fraction of the remaining daily budget
    pub warn_fraction: f64,
    /// Model-assisted: strictness at or above which large purchases decline
    pub strict_level: u8,
    /// Model-assisted: fraction of the daily limit that declines at `strict_level`
    pub strict_limit_fraction: f64,
    /// Model-assisted: strictness at or above which mid-size purchases warn
    pub moderate_level: u8,
    /// Model-assisted: fraction of the daily limit that warns at `moderate_level`
    pub moderate_limit_fraction: f64,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            warn_fraction: 0.5,
            strict_level: 8,
            strict_limit_fraction: 0.5,
            moderate_level: 5,
            moderate_limit_fraction: 0.3,
        }
    }
}

/// Inputs the policy needs, independent of how they were gathered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    pub amount: f64,
    pub remaining_daily_budget: f64,
    pub daily_spending_limit: f64,
    /// Clamped to 1..=10 by [`RecommendationPolicy::decide`]
    pub strictness_level: i32,
}

impl PolicyInput {
    pub fn from_impact(impact: &ImpactEstimate, daily_spending_limit: f64, strictness: i32) -> Self {
        Self {
            amount: impact.amount,
            remaining_daily_budget: impact.remaining_daily_budget,
            daily_spending_limit,
            strictness_level: strictness,
        }
    }
}

/// Deterministic recommendation policy
#[derive(Clone)]
pub struct RecommendationPolicy {
    thresholds: PolicyThresholds,
    interpreter: Arc<dyn ReplyInterpreter>,
}

impl std::fmt::Debug for RecommendationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationPolicy")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self::new(PolicyThresholds::default())
    }
}

impl RecommendationPolicy {
    /// Policy with the keyword reply interpreter
    pub fn new(thresholds: PolicyThresholds) -> Self {
        Self {
            thresholds,
            interpreter: Arc::new(KeywordInterpreter),
        }
    }

    /// Swap the reply interpreter (e.g. for a structured-output contract)
    pub fn with_interpreter(mut self, interpreter: Arc<dyn ReplyInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    /// Decide, using the model reply when there is one
    pub fn decide(&self, input: &PolicyInput, model_reply: Option<&str>) -> Recommendation {
        match model_reply {
            Some(reply) => self.decide_with_reply(input, reply),
            None => self.decide_fallback(input.amount, input.remaining_daily_budget),
        }
    }

    /// Fallback mode: purchase vs. remaining daily budget
    pub fn decide_fallback(&self, amount: f64, remaining_daily_budget: f64) -> Recommendation {
        if amount > remaining_daily_budget {
            Recommendation::Decline
        } else if amount > remaining_daily_budget * self.thresholds.warn_fraction {
            Recommendation::Warn
        } else {
            Recommendation::Approve
        }
    }

    /// Model-assisted mode: reply signal first, then strictness vs. daily limit
    pub fn decide_with_reply(&self, input: &PolicyInput, reply: &str) -> Recommendation {
        if let Some(recommendation) = self.interpreter.interpret(reply) {
            return recommendation;
        }
        self.decide_by_strictness(input)
    }

    fn decide_by_strictness(&self, input: &PolicyInput) -> Recommendation {
        let strictness = input.strictness_level.clamp(1, 10) as u8;
        let over_limit_factor = if input.daily_spending_limit > 0.0 {
            input.amount / input.daily_spending_limit
        } else {
            f64::INFINITY
        };

        let t = &self.thresholds;
        if strictness >= t.strict_level && over_limit_factor > t.strict_limit_fraction {
            Recommendation::Decline
        } else if strictness >= t.moderate_level && over_limit_factor > t.moderate_limit_fraction
        {
            Recommendation::Warn
        } else {
            Recommendation::Approve
        }
    }
}
