//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Ask before you spend
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Spending coach with an AI advisor and a local fallback", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip the AI backend and answer with local rules only
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask whether a purchase fits your budget
    Consult {
        /// Purchase amount in dollars
        #[arg(short, long)]
        amount: f64,

        /// What you want to buy
        #[arg(short, long)]
        description: String,

        /// Spending category (guessed from the description if not given)
        #[arg(short, long)]
        category: Option<String>,

        /// JSON file with your financial context
        #[arg(long, default_value = "context.json")]
        context: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign a category and necessity score to a transaction
    Categorize {
        /// Transaction description
        #[arg(short, long)]
        description: String,

        /// Transaction amount in dollars
        #[arg(short, long)]
        amount: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a short report on this week's spending
    Report {
        /// JSON file with your financial context
        #[arg(long, default_value = "context.json")]
        context: PathBuf,
    },

    /// AI backend diagnostics
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Manage advisor prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Inspect advisor configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Check the configured backend and send a test prompt
    Test {
        /// Prompt to send (a short greeting if not given)
        #[arg(short, long)]
        prompt: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,

    /// Show the content of a prompt
    Show {
        /// Prompt ID (e.g., consult_purchase)
        id: String,

        /// Print only the prompt file, ready to save as an override
        #[arg(long)]
        raw: bool,
    },

    /// Show the override directory
    Path,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show the override file location
    Path,
}
