//! Svar - a tool-calling AI assistant
//!
//! A terminal assistant that answers questions by calling tools.
//!
//! The name "Svar" comes from the Norwegian word for "answer."
//!
//! # Overview
//!
//! Svar gives a language model a fixed set of callable tools:
//! - Arithmetic (add, subtract, multiply, divide)
//! - Web, Wikipedia, and arXiv search
//! - CSV and Excel analysis
//! - File download and copying
//! - Image, audio, and YouTube transcript analysis
//!
//! A conversation loop decides, turn by turn, whether to call a tool or
//! answer directly. Every tool resolves to exactly one string result:
//! failures are folded into the same text channel the model reads, so the
//! loop never needs special-case failure handling.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `tools` - Tool registry, dispatch, and the adapters themselves
//! - `agent` - The conversation loop
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::agent::Agent;
//! use svar::config::{Prompts, Settings};
//! use svar::tools::ToolContext;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let prompts = Prompts::default();
//!     let system_prompt = prompts.agent.system.clone();
//!
//!     let tools = ToolContext::new(settings, prompts);
//!     let agent = Agent::new(tools, "gpt-4o-mini", &system_prompt);
//!
//!     let response = agent.run("What is 6 times 7?", None).await?;
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod tools;

pub use error::{Result, SvarError};
