//! Spending advisor
//!
//! Entry point for consultations, categorization and weekly reports. Each
//! call tries the configured AI backend once, bounded by the task's timeout,
//! and degrades to the deterministic local path on any failure. None of the
//! public operations can fail.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ai::parsing::parse_categorization;
use crate::ai::{AIBackend, AIClient, GenerationRequest};
use crate::classifier::NecessityClassifier;
use crate::config::{AdvisorConfig, TaskType};
use crate::context::{money, FinancialContext};
use crate::error::{Error, Result};
use crate::impact::ImpactEstimate;
use crate::models::{
    AdviceSource, CategorizationResult, ConsultationRequest, ConsultationResult, Recommendation,
};
use crate::policy::{PolicyInput, RecommendationPolicy};
use crate::prompts::{PromptId, PromptLibrary};
use crate::report::fallback_weekly_report;
use crate::signal::{extract_alternatives, ReplyInterpreter};

const WAIT_ALTERNATIVES: &[&str] = &[
    "Wait until tomorrow",
    "Look for a less expensive alternative",
    "Check if this is really necessary",
];

const WARN_ALTERNATIVES: &[&str] = &[
    "Consider postponing",
    "Look for discounts",
    "Check if you really need this now",
];

const WARN_MESSAGE: &str = "This purchase would use a significant portion of your remaining daily budget. Are you sure it's necessary?";

const APPROVE_MESSAGE: &str =
    "This looks reasonable within your budget. Enjoy your purchase responsibly!";

/// Spending advisor
///
/// Cheap to clone; clones share prompts and configuration.
#[derive(Clone, Debug)]
pub struct Advisor {
    client: Option<AIClient>,
    prompts: Arc<PromptLibrary>,
    config: Arc<AdvisorConfig>,
    policy: RecommendationPolicy,
    classifier: NecessityClassifier,
}

impl Advisor {
    /// Build an advisor with config and prompts from their default locations
    ///
    /// `client` is usually `AIClient::from_env()`; `None` means every call
    /// uses the local fallback.
    pub fn new(client: Option<AIClient>) -> Result<Self> {
        let config = AdvisorConfig::load()?;
        let prompts = PromptLibrary::new()?;
        Ok(Self::with_parts(client, prompts, config))
    }

    /// Build an advisor from already-loaded parts
    pub fn with_parts(
        client: Option<AIClient>,
        prompts: PromptLibrary,
        config: AdvisorConfig,
    ) -> Self {
        let policy = RecommendationPolicy::new(config.policy.clone());
        let classifier = NecessityClassifier::new().with_confidence(config.classifier_confidence);
        Self {
            client,
            prompts: Arc::new(prompts),
            config: Arc::new(config),
            policy,
            classifier,
        }
    }

    /// Replace how model replies are turned into recommendations
    pub fn with_interpreter(mut self, interpreter: Arc<dyn ReplyInterpreter>) -> Self {
        self.policy = self.policy.with_interpreter(interpreter);
        self
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.client.as_ref()
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }

    pub fn classifier(&self) -> &NecessityClassifier {
        &self.classifier
    }

    /// Advise on a prospective purchase
    pub async fn consult(
        &self,
        request: &ConsultationRequest,
        context: &FinancialContext,
    ) -> ConsultationResult {
        let mut vars = context.to_template_vars();
        vars.insert("amount", money(request.amount));
        vars.insert("description", request.description.clone());
        vars.insert("category", request.category.clone());

        match self
            .generate(TaskType::Consultation, PromptId::ConsultPurchase, &vars)
            .await
        {
            Ok(reply) => self.interpret_consultation(request, context, &reply),
            Err(e) => {
                self.log_fallback(TaskType::Consultation, &e);
                self.fallback_consultation(request, context)
            }
        }
    }

    /// Turn a model reply into a consultation result
    fn interpret_consultation(
        &self,
        request: &ConsultationRequest,
        context: &FinancialContext,
        reply: &str,
    ) -> ConsultationResult {
        let impact = ImpactEstimate::estimate(request.amount, context);
        let input = PolicyInput::from_impact(
            &impact,
            context.daily_spending_limit,
            context.strictness_level,
        );
        let recommendation = self.policy.decide(&input, Some(reply));
        debug!(recommendation = %recommendation, "Consultation answered by model");

        ConsultationResult {
            recommendation,
            message: reply.trim().to_string(),
            alternatives: extract_alternatives(reply),
            impact_analysis: impact.narrative(),
            risk_level: recommendation.risk_level(),
            source: AdviceSource::Model,
        }
    }

    /// Deterministic consultation from the budget figures alone
    pub fn fallback_consultation(
        &self,
        request: &ConsultationRequest,
        context: &FinancialContext,
    ) -> ConsultationResult {
        let impact = ImpactEstimate::estimate(request.amount, context);
        let recommendation = self
            .policy
            .decide_fallback(request.amount, impact.remaining_daily_budget);

        let (message, alternatives) = match recommendation {
            Recommendation::Decline => (
                format!(
                    "This purchase exceeds your remaining daily budget of ${:.2}. Consider waiting until tomorrow or adjusting your budget.",
                    impact.remaining_daily_budget
                ),
                WAIT_ALTERNATIVES,
            ),
            Recommendation::Warn => (WARN_MESSAGE.to_string(), WARN_ALTERNATIVES),
            Recommendation::Approve => (APPROVE_MESSAGE.to_string(), &[][..]),
        };

        ConsultationResult {
            recommendation,
            message,
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
            impact_analysis: impact.narrative(),
            risk_level: recommendation.risk_level(),
            source: AdviceSource::Fallback,
        }
    }

    /// Categorize a transaction description
    ///
    /// A model answer is used only when it is a well-formed JSON object with
    /// in-range values; anything else yields the keyword classifier's result.
    pub async fn categorize_transaction(
        &self,
        description: &str,
        amount: f64,
    ) -> CategorizationResult {
        let mut vars = HashMap::new();
        vars.insert("description", description.to_string());
        vars.insert("amount", money(amount));

        let parsed = self
            .generate(
                TaskType::Categorization,
                PromptId::CategorizeTransaction,
                &vars,
            )
            .await
            .and_then(|reply| parse_categorization(&reply, self.classifier.confidence()));

        match parsed {
            Ok(result) => {
                debug!(category = %result.category, score = result.necessity_score, "Categorized by model");
                result
            }
            Err(e) => {
                self.log_fallback(TaskType::Categorization, &e);
                self.classifier.classify(description, amount)
            }
        }
    }

    /// Write the weekly financial health report
    pub async fn weekly_report(&self, context: &FinancialContext) -> String {
        let vars = context.to_template_vars();
        match self
            .generate(TaskType::WeeklyReport, PromptId::WeeklyReport, &vars)
            .await
        {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                self.log_fallback(TaskType::WeeklyReport, &e);
                fallback_weekly_report(context)
            }
        }
    }

    /// Render a prompt and run it against the backend under the task timeout
    async fn generate(
        &self,
        task: TaskType,
        prompt_id: PromptId,
        vars: &HashMap<&str, String>,
    ) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::Config("no AI backend configured".into()))?;

        let task_config = self.config.task(task);
        let prompt = self.prompts.get(prompt_id);

        let mut request = GenerationRequest::new(prompt.render_user(vars))
            .with_max_tokens(task_config.max_tokens)
            .with_temperature(task_config.temperature);
        if let Some(system) = prompt.render_system(vars) {
            request = request.with_system(system);
        }

        let routed;
        let client = match task_config.model.as_deref() {
            Some(model) => {
                routed = client.with_model(model);
                &routed
            }
            None => client,
        };

        debug!(
            task = %task,
            model = client.model(),
            max_tokens = request.max_tokens,
            "Sending request to AI backend"
        );

        let reply = tokio::time::timeout(task_config.timeout, client.generate(&request))
            .await
            .map_err(|_| Error::Timeout(task_config.timeout))??;

        debug!(task = %task, "AI reply: {}", reply);
        Ok(reply)
    }

    fn log_fallback(&self, task: TaskType, error: &Error) {
        match (&self.client, error) {
            (None, _) => info!(task = %task, "No AI backend configured, using fallback"),
            (Some(client), e) => warn!(
                task = %task,
                model = client.model(),
                kind = e.kind(),
                error = %e,
                "AI backend unavailable, using fallback"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ai::MockBackend;
    use crate::config::TaskConfig;
    use crate::context::tests::sample_context;
    use crate::models::RiskLevel;

    fn advisor(client: Option<AIClient>) -> Advisor {
        Advisor::with_parts(
            client,
            PromptLibrary::embedded_only().unwrap(),
            AdvisorConfig::default(),
        )
    }

    fn lunch(amount: f64) -> ConsultationRequest {
        ConsultationRequest::new(amount, "Food", "Restaurant lunch")
    }

    #[tokio::test]
    async fn test_fallback_without_backend() {
        // limit 50, spent 10 → remaining 40
        let advisor = advisor(None);
        let ctx = sample_context();

        let result = advisor.consult(&lunch(45.0), &ctx).await;
        assert_eq!(result.recommendation, Recommendation::Decline);
        assert_eq!(result.source, AdviceSource::Fallback);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(
            result.message,
            "This purchase exceeds your remaining daily budget of $40.00. Consider waiting until tomorrow or adjusting your budget."
        );
        assert_eq!(result.alternatives, WAIT_ALTERNATIVES);

        let result = advisor.consult(&lunch(25.0), &ctx).await;
        assert_eq!(result.recommendation, Recommendation::Warn);
        assert_eq!(result.message, WARN_MESSAGE);
        assert_eq!(result.alternatives, WARN_ALTERNATIVES);

        let result = advisor.consult(&lunch(5.0), &ctx).await;
        assert_eq!(result.recommendation, Recommendation::Approve);
        assert_eq!(result.message, APPROVE_MESSAGE);
        assert!(result.alternatives.is_empty());
        assert!(result.impact_analysis.starts_with("This $5 purchase would use 12.5%"));
    }

    #[tokio::test]
    async fn test_model_reply_is_interpreted() {
        let mock = MockBackend::new().with_reply(
            "I'd proceed with caution here.\n\n- Cook at home instead\n- Split the bill\n- Skip dessert\n- Go tomorrow",
        );
        let advisor = advisor(Some(mock.clone().into()));
        let ctx = sample_context();

        let result = advisor.consult(&lunch(5.0), &ctx).await;
        assert_eq!(result.recommendation, Recommendation::Warn);
        assert_eq!(result.source, AdviceSource::Model);
        assert!(result.message.starts_with("I'd proceed with caution"));
        assert_eq!(result.alternatives.len(), 3);
        assert_eq!(result.alternatives[0], "- Cook at home instead");
        assert!(result.impact_analysis.contains("12.5%"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 400);
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert!(requests[0]
            .system
            .as_deref()
            .is_some_and(|s| s.contains("financial coach")));
        assert!(requests[0]
            .user
            .contains("User wants to spend $5 on Restaurant lunch (Category: Food)"));
        assert!(requests[0].user.contains("- $12.50 on Lunch (Food) - Mon Jan 15 2024"));
    }

    #[tokio::test]
    async fn test_model_reply_without_signal_uses_strictness() {
        let mock = MockBackend::new().with_reply("Here is what I think about it.");
        let advisor = advisor(Some(mock.into()));
        let mut ctx = sample_context();
        ctx.strictness_level = 9;

        // 30 / 50 = 0.6 > 0.5 at strictness 9
        let result = advisor.consult(&lunch(30.0), &ctx).await;
        assert_eq!(result.recommendation, Recommendation::Decline);
        assert_eq!(result.source, AdviceSource::Model);
        assert!(result.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_backend_errors_fall_back() {
        let ctx = sample_context();
        for mock in [MockBackend::failing(500), MockBackend::failing(429), MockBackend::empty()] {
            let advisor = advisor(Some(mock.into()));
            let result = advisor.consult(&lunch(25.0), &ctx).await;
            assert_eq!(result.source, AdviceSource::Fallback);
            assert_eq!(result.recommendation, Recommendation::Warn);
            assert!(!result.message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let mock = MockBackend::new()
            .with_reply("decline")
            .with_delay(Duration::from_secs(5));
        let mut config = AdvisorConfig::default();
        config.set_task(
            TaskType::Consultation,
            TaskConfig {
                timeout: Duration::from_millis(20),
                ..TaskConfig::default_for(TaskType::Consultation)
            },
        );
        let advisor = Advisor::with_parts(
            Some(mock.into()),
            PromptLibrary::embedded_only().unwrap(),
            config,
        );

        let result = advisor.consult(&lunch(5.0), &sample_context()).await;
        assert_eq!(result.source, AdviceSource::Fallback);
        assert_eq!(result.recommendation, Recommendation::Approve);
        assert!(!result.impact_analysis.is_empty());
    }

    #[tokio::test]
    async fn test_task_model_override() {
        let mock = MockBackend::new().with_reply("ok");
        let mut config = AdvisorConfig::default();
        config.set_task(
            TaskType::Consultation,
            TaskConfig {
                model: Some("bigger-model".to_string()),
                ..TaskConfig::default_for(TaskType::Consultation)
            },
        );
        let advisor = Advisor::with_parts(
            Some(mock.clone().into()),
            PromptLibrary::embedded_only().unwrap(),
            config,
        );

        advisor.consult(&lunch(5.0), &sample_context()).await;
        // the override shares the request log with the original mock
        assert_eq!(mock.call_count(), 1);
        assert_eq!(advisor.client().map(|c| c.model()), Some("mock"));
    }

    #[tokio::test]
    async fn test_categorize_accepts_valid_json() {
        let mock = MockBackend::new()
            .with_reply(r#"{"category": "Healthcare", "necessity_score": 9, "confidence": 0.9}"#);
        let advisor = advisor(Some(mock.clone().into()));

        let result = advisor.categorize_transaction("Pharmacy refill", 18.0).await;
        assert_eq!(result.category, "Healthcare");
        assert_eq!(result.necessity_score, 9);
        assert_eq!(result.confidence, 0.9);

        let request = &mock.requests()[0];
        assert_eq!(request.max_tokens, 100);
        assert!(request.system.is_none());
        assert!(request.user.contains("Description: \"Pharmacy refill\""));
    }

    #[tokio::test]
    async fn test_categorize_prose_reply_uses_classifier() {
        let mock = MockBackend::new().with_reply("Category: Entertainment, necessity 3");
        let advisor = advisor(Some(mock.into()));

        let result = advisor.categorize_transaction("Weekly grocery run", 60.0).await;
        assert_eq!(
            result,
            CategorizationResult {
                category: "Food".to_string(),
                necessity_score: 8,
                confidence: 0.7,
            }
        );
    }

    #[tokio::test]
    async fn test_categorize_without_backend() {
        let advisor = advisor(None);
        let result = advisor.categorize_transaction("Movie tickets", 30.0).await;
        assert_eq!(result.category, "Entertainment");
        assert_eq!(result.necessity_score, 2);
    }

    #[tokio::test]
    async fn test_weekly_report_paths() {
        let ctx = sample_context();

        let mock = MockBackend::new().with_reply("  Great week overall!  ");
        let report = advisor(Some(mock.clone().into())).weekly_report(&ctx).await;
        assert_eq!(report, "Great week overall!");
        assert_eq!(mock.requests()[0].max_tokens, 500);

        let report = advisor(Some(MockBackend::empty().into()))
            .weekly_report(&ctx)
            .await;
        assert_eq!(report, fallback_weekly_report(&ctx));

        let report = advisor(None).weekly_report(&ctx).await;
        assert!(report.starts_with("Weekly Financial Report:"));
    }

    #[test]
    fn test_advisor_is_send_sync_clone() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<Advisor>();
    }
}
