//! Advisor configuration
//!
//! Per-task generation settings (token budget, temperature, timeout and an
//! optional model override), the recommendation policy cutoffs, and the
//! classifier's reported confidence.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/advisor.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their built-in values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::classifier::HEURISTIC_CONFIDENCE;
use crate::error::{Error, Result};
use crate::policy::PolicyThresholds;

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/advisor.toml");

/// Advisor tasks that reach the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Purchase consultation
    Consultation,
    /// Transaction categorization
    Categorization,
    /// Weekly narrative report
    WeeklyReport,
}

impl TaskType {
    /// Get the config key for this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consultation => "consultation",
            Self::Categorization => "categorization",
            Self::WeeklyReport => "weekly_report",
        }
    }

    /// Get all task types
    pub fn all() -> &'static [TaskType] {
        &[Self::Consultation, Self::Categorization, Self::WeeklyReport]
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == key)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a specific task type
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    /// Maximum tokens the model may generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Wall-clock limit for the whole call
    pub timeout: Duration,
    /// Model override for this task
    pub model: Option<String>,
}

impl TaskConfig {
    /// Built-in settings for a task
    pub fn default_for(task: TaskType) -> Self {
        let (max_tokens, temperature, timeout_secs) = match task {
            TaskType::Consultation => (400, 0.7, 20),
            TaskType::Categorization => (100, 0.3, 10),
            TaskType::WeeklyReport => (500, 0.8, 30),
        };
        Self {
            max_tokens,
            temperature,
            timeout: Duration::from_secs(timeout_secs),
            model: None,
        }
    }
}

/// Full advisor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    tasks: HashMap<TaskType, TaskConfig>,
    /// Recommendation policy cutoffs
    pub policy: PolicyThresholds,
    /// Confidence reported by the keyword classifier
    pub classifier_confidence: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            tasks: TaskType::all()
                .iter()
                .map(|&t| (t, TaskConfig::default_for(t)))
                .collect(),
            policy: PolicyThresholds::default(),
            classifier_confidence: HEURISTIC_CONFIDENCE,
        }
    }
}

impl AdvisorConfig {
    /// Load from the default override location, else the embedded default
    pub fn load() -> Result<Self> {
        load_config(default_config_path().as_deref())
    }

    /// Load from a specific override path, else the embedded default
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse a TOML document on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Get the configuration for a task
    pub fn task(&self, task: TaskType) -> TaskConfig {
        self.tasks
            .get(&task)
            .cloned()
            .unwrap_or_else(|| TaskConfig::default_for(task))
    }

    /// Replace the configuration for a task
    pub fn set_task(&mut self, task: TaskType, config: TaskConfig) {
        self.tasks.insert(task, config);
    }

    /// Get the timeout for a task
    pub fn timeout_for_task(&self, task: TaskType) -> Duration {
        self.task(task).timeout
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("advisor.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AdvisorConfig> {
    let content = match override_path {
        Some(path) if path.exists() => fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    tasks: Option<HashMap<String, RawTaskConfig>>,
    policy: Option<RawPolicy>,
    classifier: Option<RawClassifier>,
}

#[derive(Debug, Deserialize)]
struct RawTaskConfig {
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPolicy {
    warn_fraction: Option<f64>,
    strict_level: Option<u8>,
    strict_limit_fraction: Option<f64>,
    moderate_level: Option<u8>,
    moderate_limit_fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawClassifier {
    confidence: Option<f64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AdvisorConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AdvisorConfig::default();

    // Apply task-specific configs
    if let Some(tasks) = raw.tasks {
        for (task_name, task_config) in tasks {
            let Some(task) = TaskType::from_key(&task_name) else {
                continue; // Skip unknown task types
            };

            let defaults = TaskConfig::default_for(task);
            let parsed = TaskConfig {
                max_tokens: task_config.max_tokens.unwrap_or(defaults.max_tokens),
                temperature: task_config.temperature.unwrap_or(defaults.temperature),
                timeout: task_config
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
                model: task_config.model.filter(|m| !m.trim().is_empty()),
            };

            if parsed.max_tokens == 0 {
                return Err(Error::Config(format!(
                    "tasks.{}.max_tokens must be positive",
                    task_name
                )));
            }
            if !(0.0..=2.0).contains(&parsed.temperature) {
                return Err(Error::Config(format!(
                    "tasks.{}.temperature must be between 0 and 2",
                    task_name
                )));
            }
            if parsed.timeout.is_zero() {
                return Err(Error::Config(format!(
                    "tasks.{}.timeout_secs must be positive",
                    task_name
                )));
            }

            config.tasks.insert(task, parsed);
        }
    }

    // Apply policy cutoffs
    if let Some(policy) = raw.policy {
        let t = &mut config.policy;
        if let Some(v) = policy.warn_fraction {
            t.warn_fraction = v;
        }
        if let Some(v) = policy.strict_level {
            t.strict_level = v;
        }
        if let Some(v) = policy.strict_limit_fraction {
            t.strict_limit_fraction = v;
        }
        if let Some(v) = policy.moderate_level {
            t.moderate_level = v;
        }
        if let Some(v) = policy.moderate_limit_fraction {
            t.moderate_limit_fraction = v;
        }
        validate_policy(t)?;
    }

    if let Some(classifier) = raw.classifier {
        if let Some(confidence) = classifier.confidence {
            if !(confidence > 0.0 && confidence <= 1.0) {
                return Err(Error::Config(format!(
                    "classifier.confidence must be in (0, 1], got {}",
                    confidence
                )));
            }
            config.classifier_confidence = confidence;
        }
    }

    Ok(config)
}

fn validate_policy(t: &PolicyThresholds) -> Result<()> {
    for (name, value) in [
        ("warn_fraction", t.warn_fraction),
        ("strict_limit_fraction", t.strict_limit_fraction),
        ("moderate_limit_fraction", t.moderate_limit_fraction),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::Config(format!(
                "policy.{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    for (name, value) in [
        ("strict_level", t.strict_level),
        ("moderate_level", t.moderate_level),
    ] {
        if !(1..=10).contains(&value) {
            return Err(Error::Config(format!(
                "policy.{} must be between 1 and 10, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AdvisorConfig::default());

        let consult = config.task(TaskType::Consultation);
        assert_eq!(consult.max_tokens, 400);
        assert!((consult.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(consult.timeout, Duration::from_secs(20));

        assert_eq!(config.task(TaskType::Categorization).max_tokens, 100);
        assert_eq!(config.task(TaskType::WeeklyReport).max_tokens, 500);
        assert_eq!(config.classifier_confidence, 0.7);
    }

    #[test]
    fn test_task_type_as_str() {
        assert_eq!(TaskType::Consultation.as_str(), "consultation");
        assert_eq!(TaskType::WeeklyReport.as_str(), "weekly_report");
        assert_eq!(TaskType::from_key("categorization"), Some(TaskType::Categorization));
        assert_eq!(TaskType::from_key("vision"), None);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
[tasks.consultation]
timeout_secs = 5
model = "gpt-4o-mini"

[tasks.vision]
timeout_secs = 120

[policy]
strict_level = 9
"#,
        )
        .unwrap();

        let consult = config.task(TaskType::Consultation);
        assert_eq!(consult.timeout, Duration::from_secs(5));
        assert_eq!(consult.max_tokens, 400);
        assert_eq!(consult.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.policy.strict_level, 9);
        assert_eq!(config.policy.warn_fraction, 0.5);
        assert_eq!(config.timeout_for_task(TaskType::WeeklyReport), Duration::from_secs(30));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), AdvisorConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = parse_config("[tasks.consultation\nmax_tokens = ").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(parse_config("[classifier]\nconfidence = 1.5").is_err());
        assert!(parse_config("[policy]\nstrict_level = 11").is_err());
        assert!(parse_config("[policy]\nwarn_fraction = -0.1").is_err());
        assert!(parse_config("[tasks.categorization]\nmax_tokens = 0").is_err());
        assert!(parse_config("[tasks.weekly_report]\ntimeout_secs = 0").is_err());
    }

    #[test]
    fn test_load_from_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("advisor.toml");
        fs::write(&path, "[classifier]\nconfidence = 0.55\n").unwrap();

        let config = AdvisorConfig::load_from(&path).unwrap();
        assert_eq!(config.classifier_confidence, 0.55);
    }

    #[test]
    fn test_missing_override_uses_embedded() {
        let dir = TempDir::new().unwrap();
        let config = AdvisorConfig::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, AdvisorConfig::default());
    }

    #[test]
    fn test_set_task() {
        let mut config = AdvisorConfig::default();
        config.set_task(
            TaskType::Consultation,
            TaskConfig {
                timeout: Duration::from_millis(50),
                ..TaskConfig::default_for(TaskType::Consultation)
            },
        );
        assert_eq!(
            config.timeout_for_task(TaskType::Consultation),
            Duration::from_millis(50)
        );
    }
}
