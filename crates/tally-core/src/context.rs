//! Financial context snapshot
//!
//! A read-only view of the user's finances at the moment they ask for advice.
//! The caller assembles it (period sums, recent transactions) and hands it to
//! the advisor; this module only renders it into prompt variables.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of recent transactions rendered into a prompt
pub const MAX_PROMPT_TRANSACTIONS: usize = 10;

/// A recent transaction, as shown to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Snapshot of the user's financial state for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialContext {
    pub monthly_income: f64,
    pub daily_spending_limit: f64,
    pub savings_goal: f64,
    pub target_date: NaiveDate,
    pub current_spent_today: f64,
    pub current_spent_this_week: f64,
    pub current_spent_this_month: f64,
    /// 1-10, higher is stricter
    pub strictness_level: i32,
    /// Most recent first
    #[serde(default)]
    pub recent_transactions: Vec<RecentTransaction>,
}

impl FinancialContext {
    /// Strictness clamped to 1..=10
    pub fn strictness(&self) -> u8 {
        self.strictness_level.clamp(1, 10) as u8
    }

    /// Daily limit minus what was already spent today (negative when over)
    pub fn remaining_daily_budget(&self) -> f64 {
        self.daily_spending_limit - self.current_spent_today
    }

    /// Convert the snapshot to template variables for prompt rendering
    pub fn to_template_vars(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();

        vars.insert("monthly_income", money(self.monthly_income));
        vars.insert("daily_limit", money(self.daily_spending_limit));
        vars.insert("spent_today", money(self.current_spent_today));
        vars.insert("spent_this_week", money(self.current_spent_this_week));
        vars.insert("spent_this_month", money(self.current_spent_this_month));
        vars.insert("savings_goal", money(self.savings_goal));
        vars.insert("target_date", display_date(self.target_date));
        vars.insert("strictness", self.strictness().to_string());

        let recent = self.recent_transactions_block();
        if !recent.is_empty() {
            vars.insert("recent_transactions", recent);
        }

        vars
    }

    /// One line per transaction, capped at [`MAX_PROMPT_TRANSACTIONS`]
    pub fn recent_transactions_block(&self) -> String {
        self.recent_transactions
            .iter()
            .take(MAX_PROMPT_TRANSACTIONS)
            .map(|t| {
                format!(
                    "- ${} on {} ({}) - {}",
                    money(t.amount),
                    t.description,
                    t.category,
                    display_date(t.date)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format a money amount without a currency sign ("12.50", "40")
pub fn money(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

/// Human-readable date ("Mon Jan 15 2024")
pub fn display_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_context() -> FinancialContext {
        FinancialContext {
            monthly_income: 4000.0,
            daily_spending_limit: 50.0,
            savings_goal: 5000.0,
            target_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            current_spent_today: 10.0,
            current_spent_this_week: 120.0,
            current_spent_this_month: 640.0,
            strictness_level: 5,
            recent_transactions: vec![RecentTransaction {
                amount: 12.5,
                category: "Food".to_string(),
                description: "Lunch".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            }],
        }
    }

    #[test]
    fn test_strictness_clamped() {
        let mut ctx = sample_context();
        ctx.strictness_level = 42;
        assert_eq!(ctx.strictness(), 10);
        ctx.strictness_level = -3;
        assert_eq!(ctx.strictness(), 1);
    }

    #[test]
    fn test_remaining_daily_budget_can_be_negative() {
        let mut ctx = sample_context();
        ctx.current_spent_today = 65.0;
        assert_eq!(ctx.remaining_daily_budget(), -15.0);
    }

    #[test]
    fn test_template_vars() {
        let vars = sample_context().to_template_vars();
        assert_eq!(vars["daily_limit"], "50");
        assert_eq!(vars["strictness"], "5");
        assert_eq!(vars["target_date"], "Wed Dec 31 2025");
        assert_eq!(
            vars["recent_transactions"],
            "- $12.50 on Lunch (Food) - Mon Jan 15 2024"
        );
    }

    #[test]
    fn test_recent_transactions_capped() {
        let mut ctx = sample_context();
        let tx = ctx.recent_transactions[0].clone();
        ctx.recent_transactions = vec![tx; 25];
        assert_eq!(
            ctx.recent_transactions_block().lines().count(),
            MAX_PROMPT_TRANSACTIONS
        );
    }

    #[test]
    fn test_no_recent_transactions_omits_var() {
        let mut ctx = sample_context();
        ctx.recent_transactions.clear();
        assert!(!ctx.to_template_vars().contains_key("recent_transactions"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "monthlyIncome": 3000,
            "dailySpendingLimit": 50,
            "savingsGoal": 0,
            "targetDate": "2025-06-01",
            "currentSpentToday": 40,
            "currentSpentThisWeek": 90,
            "currentSpentThisMonth": 300,
            "strictnessLevel": 7
        }"#;
        let ctx: FinancialContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.daily_spending_limit, 50.0);
        assert!(ctx.recent_transactions.is_empty());
    }
}
