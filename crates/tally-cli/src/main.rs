//! Tally CLI - Spending coach for the moment before you buy
//!
//! Usage:
//!   tally consult -a 25 -d "Concert ticket" --context ctx.json
//!   tally categorize -d "Weekly grocery run" -a 60
//!   tally report --context ctx.json
//!   tally ai test

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Consult {
            amount,
            description,
            category,
            context,
            json,
        } => {
            let advisor = commands::build_advisor(cli.offline)?;
            let context = commands::load_context(&context)?;
            commands::cmd_consult(&advisor, &context, amount, &description, category, json).await
        }
        Commands::Categorize {
            description,
            amount,
            json,
        } => {
            let advisor = commands::build_advisor(cli.offline)?;
            commands::cmd_categorize(&advisor, &description, amount, json).await
        }
        Commands::Report { context } => {
            let advisor = commands::build_advisor(cli.offline)?;
            let context = commands::load_context(&context)?;
            commands::cmd_report(&advisor, &context).await
        }
        Commands::Ai { action } => match action {
            AiAction::Test { prompt } => commands::cmd_ai_test(prompt.as_deref()).await,
        },
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { id, raw }) => commands::cmd_prompts_show(&id, raw),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Config { action } => match action {
            None | Some(ConfigAction::Show) => commands::cmd_config_show(),
            Some(ConfigAction::Path) => commands::cmd_config_path(),
        },
    }
}
