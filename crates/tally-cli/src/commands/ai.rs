//! AI backend diagnostics

use anyhow::Result;
use tally_core::{AIBackend, AIClient, AdvisorConfig, GenerationRequest, TaskType};

const DEFAULT_TEST_PROMPT: &str = "Reply with one short sentence of encouragement for someone saving money.";

/// Test the backend selected by the environment
pub async fn cmd_ai_test(prompt: Option<&str>) -> Result<()> {
    println!("🔍 Testing AI backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());
    println!("  AI_BACKEND: {}", backend);

    let Some(client) = AIClient::from_env() else {
        println!("\n⚠️  No AI backend configured; tally will use its local rules.");
        println!("\nTo use an AI backend:");
        println!("  OpenAI-compatible: export OPENAI_API_KEY=sk-...");
        println!("                     (or OPENAI_COMPATIBLE_HOST for a local server)");
        println!("  Ollama:            export AI_BACKEND=ollama OLLAMA_HOST=http://localhost:11434");
        return Ok(());
    };

    let config = AdvisorConfig::load()?;
    test_client(&client, &config, prompt.unwrap_or(DEFAULT_TEST_PROMPT)).await?;
    Ok(())
}

/// Health-check `client` and send it one prompt
///
/// Returns whether the prompt got a reply.
pub async fn test_client(client: &AIClient, config: &AdvisorConfig, prompt: &str) -> Result<bool> {
    let task = config.task(TaskType::Consultation);
    let client = match &task.model {
        Some(model) => client.with_model(model),
        None => client.clone(),
    };

    println!("  Backend: {}", client.kind());
    println!("  Host: {}", client.host());
    println!("  Model: {}\n", client.model());

    print!("Checking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {} at {}", client.kind(), client.host());
        return Ok(false);
    }

    let request = GenerationRequest::new(prompt)
        .with_max_tokens(task.max_tokens)
        .with_temperature(task.temperature);

    println!("\n📨 Sending test prompt (timeout {}s)...\n", task.timeout.as_secs());
    match tokio::time::timeout(task.timeout, client.generate(&request)).await {
        Ok(Ok(reply)) => {
            println!("  {}", reply.trim());
            println!("\n✅ AI backend test complete!");
            Ok(true)
        }
        Ok(Err(e)) => {
            println!("❌ Error ({}): {}", e.kind(), e);
            Ok(false)
        }
        Err(_) => {
            println!("❌ No reply within {}s", task.timeout.as_secs());
            Ok(false)
        }
    }
}
