//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (advisor setup, context loading, input validation)
//! - `advice` - Consult, categorize and weekly report commands
//! - `ai` - AI backend diagnostics
//! - `prompts` - Prompt library management commands
//! - `config` - Advisor configuration commands

pub mod advice;
pub mod ai;
pub mod config;
pub mod core;
pub mod prompts;

// Re-export command functions for main.rs
pub use advice::*;
pub use ai::*;
pub use config::*;
pub use self::core::*;
pub use prompts::*;
