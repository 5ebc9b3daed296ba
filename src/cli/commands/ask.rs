//! Ask command - one-shot agent run.

use crate::agent::Agent;
use crate::cli::output::content_preview;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::tools::ToolContext;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    file: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.model.chat.clone());
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let system_prompt = prompts.agent.system.clone();
    let max_iterations = settings.agent.max_iterations;

    let tool_context = ToolContext::new(settings, prompts);

    let agent = Agent::new(tool_context, &model, &system_prompt)
        .with_max_iterations(max_iterations);

    let spinner = Output::spinner("Thinking...");

    match agent.run(question, file.as_deref()).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.content);

            // Show tool calls summary
            if !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    Output::info(&format!(
                        "  {} {}",
                        call.name,
                        content_preview(&call.arguments, 60)
                    ));
                }
                println!();
            }

            Output::info(&format!(
                "Completed in {} iteration(s)",
                response.iterations
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Assistant failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
