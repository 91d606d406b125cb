//! Heuristic necessity classifier
//!
//! Assigns a spending category and a necessity score (1-10) to a free-text
//! transaction description. Used directly when a transaction is created and as
//! the fallback whenever AI categorization is unavailable.
//!
//! Matching is a case-insensitive substring scan over [`RULES`]. The table is
//! ordered and the first matching rule wins, so "grocery store gas station"
//! is Food, not Transportation.

use crate::models::CategorizationResult;

/// Confidence reported for every heuristic categorization.
///
/// A fixed floor, not an estimate of match quality.
pub const HEURISTIC_CONFIDENCE: f64 = 0.7;

/// Necessity score for descriptions no rule matches
pub const DEFAULT_NECESSITY: u8 = 5;

/// Categories the heuristic can assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpendingCategory {
    Food,
    Transportation,
    Entertainment,
    Bills,
    Other,
}

impl SpendingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills",
            Self::Other => "Other",
        }
    }
}

/// How a matched rule scores necessity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NecessityRule {
    Fixed(u8),
    /// `boosted` if the description also contains `keyword`, else `base`
    KeywordBoost {
        keyword: &'static str,
        boosted: u8,
        base: u8,
    },
}

impl NecessityRule {
    fn score(&self, description_lower: &str) -> u8 {
        match *self {
            Self::Fixed(score) => score,
            Self::KeywordBoost {
                keyword,
                boosted,
                base,
            } => {
                if description_lower.contains(keyword) {
                    boosted
                } else {
                    base
                }
            }
        }
    }
}

/// One row of the rule table
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    /// Lowercase substrings, any of which selects this rule
    pub keywords: &'static [&'static str],
    pub category: SpendingCategory,
    pub necessity: NecessityRule,
}

impl CategoryRule {
    pub fn matches(&self, description_lower: &str) -> bool {
        self.keywords.iter().any(|k| description_lower.contains(k))
    }
}

/// Ordered rule table; first match wins
pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        keywords: &["food", "grocery", "restaurant"],
        category: SpendingCategory::Food,
        necessity: NecessityRule::KeywordBoost {
            keyword: "grocery",
            boosted: 8,
            base: 4,
        },
    },
    CategoryRule {
        keywords: &["gas", "uber", "transport"],
        category: SpendingCategory::Transportation,
        necessity: NecessityRule::Fixed(7),
    },
    CategoryRule {
        keywords: &["movie", "entertainment", "game"],
        category: SpendingCategory::Entertainment,
        necessity: NecessityRule::Fixed(2),
    },
    CategoryRule {
        keywords: &["rent", "utility", "phone"],
        category: SpendingCategory::Bills,
        necessity: NecessityRule::Fixed(9),
    },
];

/// Rule-table classifier
#[derive(Debug, Clone)]
pub struct NecessityClassifier {
    rules: &'static [CategoryRule],
    confidence: f64,
}

impl Default for NecessityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NecessityClassifier {
    /// Classifier over the built-in [`RULES`]
    pub fn new() -> Self {
        Self {
            rules: RULES,
            confidence: HEURISTIC_CONFIDENCE,
        }
    }

    /// Override the reported confidence (clamped into (0, 1])
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence > 0.0 && confidence <= 1.0 {
            confidence
        } else {
            HEURISTIC_CONFIDENCE
        };
        self
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Find the first rule matching a description
    pub fn matching_rule(&self, description: &str) -> Option<&CategoryRule> {
        let lower = description.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lower))
    }

    /// Categorize a description. The amount does not influence the heuristic.
    pub fn classify(&self, description: &str, _amount: f64) -> CategorizationResult {
        let lower = description.to_lowercase();
        let (category, necessity_score) = match self.rules.iter().find(|r| r.matches(&lower)) {
            Some(rule) => (rule.category, rule.necessity.score(&lower)),
            None => (SpendingCategory::Other, DEFAULT_NECESSITY),
        };

        CategorizationResult {
            category: category.as_str().to_string(),
            necessity_score,
            confidence: self.confidence,
        }
    }
}

/// Categorize with the default rule table
pub fn classify(description: &str, amount: f64) -> CategorizationResult {
    NecessityClassifier::new().classify(description, amount)
}
