//! Reading structure out of free-text model replies
//!
//! Model output is untrusted prose. Everything that tries to pull a decision or
//! a list out of it lives here, behind narrow functions, so the policy and the
//! fallback path never look at raw text themselves.

use crate::models::Recommendation;

/// Maximum number of alternatives attached to a consultation
pub const MAX_ALTERNATIVES: usize = 3;

/// Turns a model reply into a recommendation, or `None` when the reply does
/// not state one.
pub trait ReplyInterpreter: Send + Sync {
    fn interpret(&self, reply: &str) -> Option<Recommendation>;
}

/// Ordered keyword table: the first group with any hit decides
const KEYWORD_SIGNALS: &[(&[&str], Recommendation)] = &[
    (&["decline", "not recommend"], Recommendation::Decline),
    (&["warn", "caution"], Recommendation::Warn),
];

/// Case-insensitive keyword scan.
///
/// Declining language outranks cautionary language wherever it appears. The
/// scan never yields `Approve`: approval is left to the numeric policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordInterpreter;

impl ReplyInterpreter for KeywordInterpreter {
    fn interpret(&self, reply: &str) -> Option<Recommendation> {
        let lower = reply.to_lowercase();
        KEYWORD_SIGNALS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, recommendation)| *recommendation)
    }
}

/// Line markers treated as list bullets when followed by whitespace
const BULLET_MARKERS: &[char] = &['-', '*', '•'];

/// Phrases that mark a line as a suggestion even without a bullet
const ALTERNATIVE_PHRASES: &[&str] = &["alternative", "instead"];

/// `- item`, not `---` or `**Bold heading**`
fn is_bullet(line: &str) -> bool {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), Some(next)) => {
            BULLET_MARKERS.contains(&marker)
                && next.is_whitespace()
                && !chars.as_str().trim().is_empty()
        }
        _ => false,
    }
}

fn is_alternative_line(line: &str) -> bool {
    if is_bullet(line) {
        return true;
    }
    let lower = line.to_lowercase();
    ALTERNATIVE_PHRASES.iter().any(|p| lower.contains(p))
}

/// Pull up to [`MAX_ALTERNATIVES`] suggestion lines out of a reply.
///
/// Lines are trimmed and returned in reply order.
pub fn extract_alternatives(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_alternative_line(line))
        .take(MAX_ALTERNATIVES)
        .map(str::to_string)
        .collect()
}
