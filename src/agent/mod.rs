//! Agent system for task execution with tool calling.
//!
//! Provides the conversation loop that lets the model alternate between
//! calling tools and answering directly until the task is done.

mod runner;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
