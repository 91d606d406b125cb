//! Purchase impact estimation
//!
//! Pure arithmetic over a [`FinancialContext`]: how much of today's remaining
//! budget a purchase would use, and how large it is relative to the savings
//! goal. Both ratios feed the recommendation policy; the narrative is shown to
//! the user on every consultation, model-assisted or not.

use crate::context::{money, FinancialContext};

/// Raw impact figures for one prospective purchase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEstimate {
    pub amount: f64,
    /// Daily limit minus today's spending (negative when already over)
    pub remaining_daily_budget: f64,
    /// `amount / remaining`, or `+inf` when nothing remains
    pub budget_usage_ratio: f64,
    /// `amount / savings_goal`, or `0` when no goal is set
    pub goal_delay_ratio: f64,
    pub has_savings_goal: bool,
}

impl ImpactEstimate {
    pub fn estimate(amount: f64, context: &FinancialContext) -> Self {
        let remaining_daily_budget = context.remaining_daily_budget();

        let budget_usage_ratio = if remaining_daily_budget > 0.0 {
            amount / remaining_daily_budget
        } else {
            f64::INFINITY
        };

        let has_savings_goal = context.savings_goal > 0.0;
        let goal_delay_ratio = if has_savings_goal {
            amount / context.savings_goal
        } else {
            0.0
        };

        Self {
            amount,
            remaining_daily_budget,
            budget_usage_ratio,
            goal_delay_ratio,
            has_savings_goal,
        }
    }

    /// Whether the purchase is larger than what is left for today
    pub fn exceeds_remaining_budget(&self) -> bool {
        self.amount > self.remaining_daily_budget
    }

    /// Human-readable summary of both ratios
    pub fn narrative(&self) -> String {
        let budget_part = if self.budget_usage_ratio.is_finite() {
            format!(
                "use {:.1}% of your remaining daily budget",
                self.budget_usage_ratio * 100.0
            )
        } else {
            "exceed your remaining daily budget entirely".to_string()
        };

        if self.has_savings_goal {
            format!(
                "This ${} purchase would {} and delay your savings goal by {:.2}%.",
                money(self.amount),
                budget_part,
                self.goal_delay_ratio * 100.0
            )
        } else {
            format!(
                "This ${} purchase would {}; you have no savings goal set.",
                money(self.amount),
                budget_part
            )
        }
    }
}

/// Impact narrative for a purchase
pub fn estimate_impact(amount: f64, context: &FinancialContext) -> String {
    ImpactEstimate::estimate(amount, context).narrative()
}
