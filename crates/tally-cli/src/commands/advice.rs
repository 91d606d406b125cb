//! Advice command implementations (consult, categorize, report)

use anyhow::Result;
use tally_core::{
    AdviceSource, Advisor, CategorizationResult, ConsultationRequest, ConsultationResult,
    FinancialContext, Recommendation,
};

use super::validate_purchase;

/// Ask the advisor about a purchase and print the answer
pub async fn cmd_consult(
    advisor: &Advisor,
    context: &FinancialContext,
    amount: f64,
    description: &str,
    category: Option<String>,
    json: bool,
) -> Result<()> {
    validate_purchase(amount, description)?;

    let category = category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| advisor.classifier().classify(description, amount).category);

    let request = ConsultationRequest::new(amount, category, description.trim());
    let result = advisor.consult(&request, context).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_consultation(&result));
    }

    Ok(())
}

/// Categorize a transaction description and print the result
pub async fn cmd_categorize(
    advisor: &Advisor,
    description: &str,
    amount: f64,
    json: bool,
) -> Result<()> {
    validate_purchase(amount, description)?;

    let result = advisor
        .categorize_transaction(description.trim(), amount)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_categorization(&result));
    }

    Ok(())
}

/// Print this week's spending report
pub async fn cmd_report(advisor: &Advisor, context: &FinancialContext) -> Result<()> {
    let report = advisor.weekly_report(context).await;
    println!("{}", report);
    Ok(())
}

/// Human-readable rendering of a consultation
pub fn format_consultation(result: &ConsultationResult) -> String {
    let icon = match result.recommendation {
        Recommendation::Approve => "✅",
        Recommendation::Warn => "⚠️ ",
        Recommendation::Decline => "❌",
    };
    let source = match result.source {
        AdviceSource::Model => "AI advisor",
        AdviceSource::Fallback => "local rules",
    };

    let mut out = format!(
        "{} {} (risk: {}, from {})\n\n{}\n\n📊 {}",
        icon,
        result.recommendation.as_str().to_uppercase(),
        result.risk_level.as_str(),
        source,
        result.message.trim(),
        result.impact_analysis
    );

    if !result.alternatives.is_empty() {
        out.push_str("\n\n💡 Alternatives:");
        for alt in &result.alternatives {
            let alt = alt.trim_start_matches(['-', '*', '•']).trim();
            out.push_str(&format!("\n  • {}", alt));
        }
    }

    out
}

/// Human-readable rendering of a categorization
pub fn format_categorization(result: &CategorizationResult) -> String {
    format!(
        "Category:   {}\nNecessity:  {}/10 (level {}/5)\nConfidence: {:.0}%",
        result.category,
        result.necessity_score,
        result.necessity_level(),
        result.confidence * 100.0
    )
}
