//! Tools command - list the tool catalog.

use crate::cli::Output;
use crate::tools::tool_definitions;
use console::style;

/// Print the available tools with their model-facing descriptions.
pub fn run_tools() -> anyhow::Result<()> {
    let definitions = tool_definitions();

    Output::header(&format!("Available tools ({})", definitions.len()));
    println!();

    for def in &definitions {
        println!("  {}", style(&def.function.name).bold().cyan());
        if let Some(description) = &def.function.description {
            println!("    {}", style(description).dim());
        }
    }

    println!();
    Ok(())
}
