//! Prompt library for the advisor
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! This allows users to customize prompts without modifying the source,
//! while automatically getting new default prompts on upgrade.
//!
//! Every prompt is loaded once when the library is built, so a library can be
//! shared between concurrent consultations without locking.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const CONSULT_PURCHASE: &str = include_str!("../../../prompts/consult_purchase.md");
    pub const CATEGORIZE_TRANSACTION: &str =
        include_str!("../../../prompts/categorize_transaction.md");
    pub const WEEKLY_REPORT: &str = include_str!("../../../prompts/weekly_report.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    ConsultPurchase,
    CategorizeTransaction,
    WeeklyReport,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConsultPurchase => "consult_purchase",
            Self::CategorizeTransaction => "categorize_transaction",
            Self::WeeklyReport => "weekly_report",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[
            Self::ConsultPurchase,
            Self::CategorizeTransaction,
            Self::WeeklyReport,
        ]
    }

    /// Parse a prompt ID from its string form
    pub fn parse(s: &str) -> Option<PromptId> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }

    fn index(&self) -> usize {
        match self {
            Self::ConsultPurchase => 0,
            Self::CategorizeTransaction => 1,
            Self::WeeklyReport => 2,
        }
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::ConsultPurchase => defaults::CONSULT_PURCHASE,
            Self::CategorizeTransaction => defaults::CATEGORIZE_TRANSACTION,
            Self::WeeklyReport => defaults::WEEKLY_REPORT,
        }
    }
}

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Advisor task this prompt serves (consultation, categorization, weekly_report)
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    /// Path to override file (if any)
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the system section, if the prompt has one
    pub fn render_system(&self, vars: &HashMap<&str, String>) -> Option<String> {
        self.system_section().map(|s| render_template(s, vars))
    }

    /// Render just the user section with variables
    ///
    /// Prompts without section headers are rendered whole.
    pub fn render_user(&self, vars: &HashMap<&str, String>) -> String {
        match self.user_section() {
            Some(user) => render_template(user, vars),
            None => render_template(&self.content, vars),
        }
    }
}

/// Prompt library holding every known prompt
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    /// Override directory path
    override_dir: Option<PathBuf>,
    /// Loaded prompts, indexed by `PromptId::index`
    prompts: Vec<Prompt>,
}

impl PromptLibrary {
    /// Create a prompt library with the default override directory
    pub fn new() -> Result<Self> {
        Self::load(default_prompts_dir())
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Result<Self> {
        Self::load(Some(path))
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Result<Self> {
        Self::load(None)
    }

    fn load(override_dir: Option<PathBuf>) -> Result<Self> {
        let mut prompts = Vec::with_capacity(PromptId::all().len());
        for id in PromptId::all() {
            prompts.push(load_prompt(*id, override_dir.as_ref())?);
        }
        Ok(Self {
            override_dir,
            prompts,
        })
    }

    /// Get a prompt by ID
    pub fn get(&self, id: PromptId) -> &Prompt {
        &self.prompts[id.index()]
    }

    /// List all prompts with their override status
    pub fn list(&self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let prompt = self.get(id);
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.metadata.version,
                    task_type: prompt.metadata.task_type.clone(),
                    has_override: prompt.is_override,
                    override_path: prompt.override_path.clone(),
                }
            })
            .collect()
    }

    /// Get the override directory path
    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Full prompt file text, frontmatter included
    ///
    /// Reads the override file when one is in use, else returns the embedded
    /// default. The result is a valid override file as-is.
    pub fn source(&self, id: PromptId) -> Result<String> {
        match &self.get(id).override_path {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => Ok(id.default_content().to_string()),
        }
    }
}

/// Load one prompt, preferring a valid override
///
/// A broken override file is logged and skipped in favour of the embedded
/// default; a broken embedded default is an error.
fn load_prompt(id: PromptId, override_dir: Option<&PathBuf>) -> Result<Prompt> {
    if let Some(override_dir) = override_dir {
        let override_path = override_dir.join(format!("{}.md", id.as_str()));
        if override_path.exists() {
            let parsed = fs::read_to_string(&override_path)
                .map_err(Error::from)
                .and_then(|content| parse_prompt(&content));
            match parsed {
                Ok((metadata, body)) => {
                    return Ok(Prompt {
                        metadata,
                        content: body,
                        is_override: true,
                        override_path: Some(override_path),
                    });
                }
                Err(e) => {
                    warn!(
                        prompt = id.as_str(),
                        path = %override_path.display(),
                        error = %e,
                        "Ignoring invalid prompt override"
                    );
                }
            }
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    /// Prompt identifier
    pub id: String,
    /// Version from metadata
    pub version: u32,
    /// Advisor task type
    pub task_type: String,
    /// Whether an override is in use
    pub has_override: bool,
    /// Path to override file (if in use)
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("prompts").join("overrides"))
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    // Check for YAML frontmatter
    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    // Find end of frontmatter
    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Find the next header or end of content
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Resolve conditionals, then substitute `{{var}}` placeholders in one pass
///
/// Substituted values are never scanned again, so user text containing braces
/// cannot inject template syntax. Unknown placeholders are left as-is.
fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let resolved = resolve_conditionals(template, vars);

    let mut out = String::with_capacity(resolved.len());
    let mut rest = resolved.as_str();
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let name = after[..close].trim();
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Keep `{{#if var}}...{{/if}}` blocks whose variable is set and non-empty
fn resolve_conditionals(content: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = content.to_string();

    loop {
        let Some(if_start) = result.find("{{#if ") else {
            break;
        };
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_end].trim().to_string();
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_end = block_start + endif_pos;
        let full_end = block_end + 7;

        let keep = vars.get(var_name.as_str()).is_some_and(|v| !v.is_empty());
        result = if keep {
            format!(
                "{}{}{}",
                &result[..if_start],
                &result[block_start..block_end],
                &result[full_end..]
            )
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}
