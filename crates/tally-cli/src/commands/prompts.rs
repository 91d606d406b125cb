//! Prompts-related command implementations

use anyhow::{bail, Context, Result};
use tally_core::prompts::{default_prompts_dir, PromptId, PromptLibrary};

/// List all available prompts and their override status
pub fn cmd_prompts_list() -> Result<()> {
    let library = PromptLibrary::new()?;

    println!("Available Prompts:\n");

    // Header
    println!(
        "{:<25} {:>7}  {:<16}  {}",
        "ID", "VERSION", "TASK TYPE", "OVERRIDE"
    );
    println!("{}", "-".repeat(64));

    for info in library.list() {
        let override_status = if info.has_override {
            "✓ Custom"
        } else {
            "Default"
        };

        println!(
            "{:<25} {:>7}  {:<16}  {}",
            info.id, info.version, info.task_type, override_status
        );
    }

    println!();
    println!(
        "Override directory: {}",
        library
            .override_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );

    println!();
    println!("To customize a prompt:");
    println!("  1. Save the default: tally prompts show <id> --raw > <override dir>/<id>.md");
    println!("  2. Edit the file with your changes (keep the --- frontmatter)");
    println!("  3. The next tally command picks it up");

    Ok(())
}

/// Show the content of a specific prompt
///
/// With `raw` only the prompt file itself is printed, frontmatter included.
pub fn cmd_prompts_show(prompt_id: &str, raw: bool) -> Result<()> {
    let Some(id) = PromptId::parse(prompt_id) else {
        let available: Vec<&str> = PromptId::all().iter().map(|id| id.as_str()).collect();
        bail!(
            "Unknown prompt ID: {} (available: {})",
            prompt_id,
            available.join(", ")
        );
    };

    let library = PromptLibrary::new()?;
    if raw {
        print!("{}", prompt_source(&library, id)?);
        return Ok(());
    }

    let prompt = library.get(id);

    println!("Prompt: {}", prompt.metadata.id);
    println!("Version: {}", prompt.metadata.version);
    println!("Task Type: {}", prompt.metadata.task_type);
    println!(
        "Source: {}",
        if prompt.is_override {
            "Override"
        } else {
            "Default"
        }
    );

    if let Some(ref path) = prompt.override_path {
        println!("Override Path: {}", path.display());
    }

    println!();
    println!("--- Content ---");
    println!("{}", prompt.content);

    Ok(())
}

/// Prompt file text as it should be saved in the override directory
pub fn prompt_source(library: &PromptLibrary, id: PromptId) -> Result<String> {
    library
        .source(id)
        .with_context(|| format!("Failed to read prompt source for {}", id))
}

/// Show the path where prompt overrides should be placed
pub fn cmd_prompts_path() -> Result<()> {
    match default_prompts_dir() {
        Some(path) => {
            println!("{}", path.display());

            if !path.exists() {
                eprintln!();
                eprintln!("Note: This directory does not exist yet.");
                eprintln!("Create it to start adding custom prompts.");
            }
        }
        None => {
            eprintln!("Could not determine prompts directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}
