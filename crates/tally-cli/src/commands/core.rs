//! Shared command utilities

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::{AIClient, Advisor, FinancialContext};

/// Build the advisor from the environment and the default config locations
///
/// With `offline` no backend is created and every answer comes from the
/// local rules.
pub fn build_advisor(offline: bool) -> Result<Advisor> {
    let client = if offline { None } else { AIClient::from_env() };

    match &client {
        Some(c) => tracing::debug!(backend = c.kind(), "Using AI backend"),
        None => tracing::debug!("No AI backend, using local rules"),
    }

    Advisor::new(client).context("Failed to load advisor configuration or prompts")
}

/// Load a financial context snapshot from a JSON file
pub fn load_context(path: &Path) -> Result<FinancialContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    parse_context(&content).with_context(|| format!("Invalid context file: {}", path.display()))
}

/// Parse a financial context snapshot from JSON text
pub fn parse_context(content: &str) -> Result<FinancialContext> {
    let context: FinancialContext = serde_json::from_str(content)?;

    let amounts = [
        ("monthlyIncome", context.monthly_income),
        ("dailySpendingLimit", context.daily_spending_limit),
        ("savingsGoal", context.savings_goal),
        ("currentSpentToday", context.current_spent_today),
        ("currentSpentThisWeek", context.current_spent_this_week),
        ("currentSpentThisMonth", context.current_spent_this_month),
    ];
    for (field, value) in amounts {
        if !value.is_finite() || value < 0.0 {
            bail!("{} must be a non-negative amount (got {})", field, value);
        }
    }

    Ok(context)
}

/// Reject purchases the advisor should never see
pub fn validate_purchase(amount: f64, description: &str) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be greater than zero (got {})", amount);
    }
    if description.trim().is_empty() {
        bail!("Description cannot be empty");
    }
    Ok(())
}
