//! Deterministic weekly report
//!
//! Used when the model cannot write the weekly narrative.

use crate::context::{money, FinancialContext};

/// Days in a budgeting week
const DAYS_PER_WEEK: f64 = 7.0;

/// Assessment tiers, checked top to bottom against spent / weekly budget
const ASSESSMENTS: &[(f64, &str)] = &[
    (
        1.2,
        "You've exceeded your weekly budget significantly. Let's focus on getting back on track.",
    ),
    (
        1.0,
        "You're slightly over your weekly budget, but nothing too concerning.",
    ),
    (
        0.8,
        "You're doing well staying within your budget this week!",
    ),
];

const DISCIPLINED: &str = "Excellent budget discipline this week! Keep up the great work.";

/// Weekly budget implied by the daily limit
pub fn weekly_budget(context: &FinancialContext) -> f64 {
    context.daily_spending_limit * DAYS_PER_WEEK
}

/// Share of the weekly budget already spent (0 when there is no budget)
pub fn weekly_spending_ratio(context: &FinancialContext) -> f64 {
    let budget = weekly_budget(context);
    if budget > 0.0 {
        context.current_spent_this_week / budget
    } else {
        0.0
    }
}

/// One-sentence assessment for a spending ratio
pub fn assessment(ratio: f64) -> &'static str {
    ASSESSMENTS
        .iter()
        .find(|(cutoff, _)| ratio > *cutoff)
        .map(|(_, text)| *text)
        .unwrap_or(DISCIPLINED)
}

/// Build the fallback weekly report
pub fn fallback_weekly_report(context: &FinancialContext) -> String {
    let ratio = weekly_spending_ratio(context);
    format!(
        "Weekly Financial Report:\n\n{}\n\nThis week you spent ${} out of your ${} budget.\n\nKeep focusing on your savings goal of ${}. Every dollar saved gets you closer!",
        assessment(ratio),
        money(context.current_spent_this_week),
        money(weekly_budget(context)),
        money(context.savings_goal),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::sample_context;

    #[test]
    fn test_assessment_tiers() {
        assert!(assessment(1.5).starts_with("You've exceeded"));
        assert!(assessment(1.2).starts_with("You're slightly over"));
        assert!(assessment(1.1).starts_with("You're slightly over"));
        assert!(assessment(1.0).starts_with("You're doing well"));
        assert!(assessment(0.81).starts_with("You're doing well"));
        assert_eq!(assessment(0.8), DISCIPLINED);
        assert_eq!(assessment(0.0), DISCIPLINED);
    }

    #[test]
    fn test_fallback_report_text() {
        // limit 50 → weekly budget 350; spent 120 this week
        let ctx = sample_context();
        let report = fallback_weekly_report(&ctx);

        assert!(report.starts_with("Weekly Financial Report:\n\n"));
        assert!(report.contains(DISCIPLINED));
        assert!(report.contains("This week you spent $120 out of your $350 budget."));
        assert!(report.contains("savings goal of $5000"));
    }

    #[test]
    fn test_over_budget_week() {
        let mut ctx = sample_context();
        ctx.current_spent_this_week = 450.0;
        assert!((weekly_spending_ratio(&ctx) - 450.0 / 350.0).abs() < 1e-9);
        assert!(fallback_weekly_report(&ctx).contains("exceeded your weekly budget significantly"));
    }

    #[test]
    fn test_zero_limit_has_zero_ratio() {
        let mut ctx = sample_context();
        ctx.daily_spending_limit = 0.0;
        assert_eq!(weekly_spending_ratio(&ctx), 0.0);
        assert!(fallback_weekly_report(&ctx).contains("out of your $0 budget"));
    }
}
