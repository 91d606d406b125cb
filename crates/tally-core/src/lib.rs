//! Tally Core Library
//!
//! Shared functionality for the Tally spending coach:
//! - Keyword necessity classifier for transaction descriptions
//! - Purchase impact estimation against the daily budget and savings goal
//! - Deterministic recommendation policy (approve / warn / decline)
//! - Pluggable AI backends (OpenAI-compatible, Ollama, mock)
//! - Advisor that consults the model and falls back locally on any failure
//! - Prompt library and advisor config with user overrides

pub mod advisor;
pub mod ai;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod impact;
pub mod models;
pub mod policy;
pub mod prompts;
pub mod report;
pub mod signal;

/// Test utilities including a mock AI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::Advisor;
pub use ai::{
    AIBackend, AIClient, GenerationRequest, MockBackend, OllamaBackend, OpenAICompatibleBackend,
};
pub use classifier::{classify, NecessityClassifier, SpendingCategory};
pub use config::{AdvisorConfig, TaskConfig, TaskType};
pub use context::{FinancialContext, RecentTransaction};
pub use error::{Error, Result};
pub use impact::{estimate_impact, ImpactEstimate};
pub use models::{
    AdviceSource, CategorizationResult, ConsultationRequest, ConsultationResult, Recommendation,
    RiskLevel,
};
pub use policy::{PolicyInput, PolicyThresholds, RecommendationPolicy};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use report::fallback_weekly_report;
pub use signal::{extract_alternatives, KeywordInterpreter, ReplyInterpreter};
