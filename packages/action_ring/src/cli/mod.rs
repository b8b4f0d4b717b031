pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use ring_gesture::{Gesture, GestureConfig};

use crate::ai::{AiDispatcher, AiRequest, ProviderKind};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::intent::{all_intents, build_prompt, intent_for};

/// Print the intent table, optionally for one context.
pub fn intents_command(context: Option<AppContext>, json: bool) -> Result<()> {
    let entries: Vec<_> = all_intents()
        .into_iter()
        .filter(|e| context.is_none_or(|c| e.context == c))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:<10} {:<12} {:<26} {}", "CONTEXT", "GESTURE", "INTENT", "AI ACTION");
    println!("{}", "-".repeat(100));
    for entry in &entries {
        println!(
            "{:<10} {:<12} {:<26} {}",
            entry.context, entry.gesture, entry.intent.label, entry.intent.ai_action
        );
    }
    Ok(())
}

/// Show the prompt and system message a gesture would produce, and
/// optionally send it.
pub async fn prompt_command(
    config: &AppConfig,
    context: AppContext,
    gesture: &str,
    provider: ProviderKind,
    send: bool,
) -> Result<()> {
    let gesture: Gesture = gesture.parse()?;
    let intent = intent_for(context, gesture);
    let request = AiRequest {
        prompt: build_prompt(context, gesture),
        context: context.as_str().to_string(),
        gesture: gesture.as_str().to_string(),
    };

    eprintln!();
    eprintln!("  Context:  {} ({})", context.name(), context);
    eprintln!("  Gesture:  {}", gesture);
    eprintln!("  Intent:   {}", intent.label);
    eprintln!("  Provider: {}", provider);
    eprintln!();
    eprintln!("  System:   {}", provider.system_message(&request.context, &request.gesture));
    eprintln!();
    println!("{}", request.prompt);

    if !send {
        return Ok(());
    }
    if gesture.is_idle() {
        eprintln!("\n  (idle has no action to send)");
        return Ok(());
    }

    let dispatcher = AiDispatcher::new(&config.providers, config.dispatch.request_timeout)
        .context("Failed to build HTTP client")?;
    match dispatcher.dispatch_to(provider, &request).await {
        Ok(reply) => {
            eprintln!("\n  Response ({}):\n", reply.model);
            println!("{}", reply.response);
        }
        Err(e) => {
            eprintln!("\n  Error: {}", e);
            eprintln!("  {}", e.client_body());
        }
    }
    Ok(())
}

/// Run a pointer script through the classifier.
pub fn simulate_command(script_path: &Path, config: GestureConfig, json: bool) -> Result<()> {
    let script = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script: {}", script_path.display()))?;
    let events = simulate::parse_script(&script)
        .with_context(|| format!("Invalid script: {}", script_path.display()))?;
    let transitions = simulate::simulate(&events, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&transitions)?);
    } else if transitions.is_empty() {
        println!("No gestures recognized.");
    } else {
        println!("{:>8}  {:<12} {}", "TIME", "GESTURE", "ROTATION");
        for t in &transitions {
            println!("{:>6}ms  {:<12} {:.1}", t.at_ms, t.gesture, t.rotation);
        }
        println!("\n{} transition(s)", transitions.len());
    }
    Ok(())
}
