//! Advisor configuration commands

use anyhow::Result;
use tally_core::config::{default_config_path, AdvisorConfig, TaskType};

/// Show the effective advisor configuration
pub fn cmd_config_show() -> Result<()> {
    let config = AdvisorConfig::load()?;
    print!("{}", format_config(&config));

    let source = default_config_path()
        .filter(|p| p.exists())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    println!("\nLoaded from: {}", source);

    Ok(())
}

/// Show where the config override file lives
pub fn cmd_config_path() -> Result<()> {
    match default_config_path() {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!();
                eprintln!("Note: No override file yet; built-in defaults are in use.");
            }
        }
        None => {
            eprintln!("Could not determine config directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}

/// Tabular rendering of the task settings, thresholds and classifier
pub fn format_config(config: &AdvisorConfig) -> String {
    let mut out = String::from("Tasks:\n\n");
    out.push_str(&format!(
        "{:<15} {:>10} {:>11} {:>8}  {}\n",
        "TASK", "MAX TOKENS", "TEMPERATURE", "TIMEOUT", "MODEL"
    ));
    out.push_str(&format!("{}\n", "-".repeat(60)));

    for &task in TaskType::all() {
        let cfg = config.task(task);
        out.push_str(&format!(
            "{:<15} {:>10} {:>11.2} {:>7}s  {}\n",
            task.as_str(),
            cfg.max_tokens,
            cfg.temperature,
            cfg.timeout.as_secs(),
            cfg.model.as_deref().unwrap_or("(backend default)")
        ));
    }

    let p = &config.policy;
    out.push_str("\nPolicy:\n");
    out.push_str(&format!("  warn_fraction:           {}\n", p.warn_fraction));
    out.push_str(&format!("  strict_level:            {}\n", p.strict_level));
    out.push_str(&format!("  strict_limit_fraction:   {}\n", p.strict_limit_fraction));
    out.push_str(&format!("  moderate_level:          {}\n", p.moderate_level));
    out.push_str(&format!("  moderate_limit_fraction: {}\n", p.moderate_limit_fraction));

    out.push_str(&format!(
        "\nClassifier:\n  confidence: {}\n",
        config.classifier_confidence
    ));
    out
}
