//! Tool definitions, parsing, and dispatch for the assistant.
//!
//! Every tool resolves to one adapter call and exactly one string result.
//! Adapters report failures as typed errors internally; [`ToolContext::dispatch`]
//! is the boundary where those errors are collapsed into descriptive text
//! for the model, so the conversation loop never handles tool failures.

pub mod files;
pub mod math;
pub mod media;
pub mod search;
pub mod spreadsheet;
pub mod youtube;

use crate::config::{Prompts, Settings};
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Timeout for search/download HTTP requests.
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Available tools for the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Add two integers.
    Add { a: i64, b: i64 },

    /// Subtract the second integer from the first.
    Subtract { a: i64, b: i64 },

    /// Multiply two integers.
    Multiply { a: i64, b: i64 },

    /// Divide the first integer by the second.
    Divide { a: i64, b: i64 },

    /// Search the web.
    WebSearch { query: String },

    /// Search Wikipedia.
    WikiSearch { query: String },

    /// Search arXiv.
    ArxivSearch { query: String },

    /// Answer a question about a CSV file.
    AnalyzeCsv { file_path: String, question: String },

    /// Answer a question about an Excel file.
    AnalyzeExcel { file_path: String, question: String },

    /// Download a URL to a local temp file.
    DownloadFile { url: String },

    /// Copy a local text file into the temp directory.
    ReadAndSaveFile { file_path: String },

    /// Answer a question about an image.
    AnalyzeImage { img_path: String, question: String },

    /// Extract all text from an image.
    ExtractTextFromImage { img_path: String },

    /// Answer a question about audio at a URL.
    AnalyzeAudio { audio_url: String, question: String },

    /// Answer a question about a YouTube video from its transcript.
    AnalyzeYoutube { url: String, question: String },
}

/// Tool execution context holding the injected client handles.
pub struct ToolContext {
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
    settings: Settings,
    prompts: Prompts,
    temp_dir: PathBuf,
}

impl ToolContext {
    /// Create a new tool context from settings and prompts.
    pub fn new(settings: Settings, prompts: Prompts) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let temp_dir = settings.temp_dir();

        Self {
            client: create_client(),
            http,
            settings,
            prompts,
            temp_dir,
        }
    }

    /// Invoke a tool by name with JSON arguments, returning a string on
    /// every path.
    ///
    /// This is the normalization boundary: parse failures, adapter errors,
    /// and domain errors all become descriptive text in the same channel as
    /// successful results.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> String {
        info!("Calling tool: {} with args: {}", name, arguments);

        match parse_tool_call(name, arguments) {
            Ok(tool) => match self.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::Add { a, b } => Ok(math::add(*a, *b).to_string()),
            ToolCall::Subtract { a, b } => Ok(math::subtract(*a, *b).to_string()),
            ToolCall::Multiply { a, b } => Ok(math::multiply(*a, *b).to_string()),
            ToolCall::Divide { a, b } => Ok(math::divide(*a, *b)?.to_string()),

            ToolCall::WebSearch { query } => {
                search::web_search(&self.http, &self.settings.search, query).await
            }
            ToolCall::WikiSearch { query } => {
                search::wiki_search(&self.http, &self.settings.search, query).await
            }
            ToolCall::ArxivSearch { query } => {
                search::arxiv_search(&self.http, &self.settings.search, query).await
            }

            ToolCall::AnalyzeCsv { file_path, question } => {
                spreadsheet::analyze_csv(file_path, question)
            }
            ToolCall::AnalyzeExcel { file_path, question } => {
                spreadsheet::analyze_excel(file_path, question)
            }

            ToolCall::DownloadFile { url } => {
                files::download_file(&self.http, &self.temp_dir, url).await
            }
            ToolCall::ReadAndSaveFile { file_path } => {
                files::read_and_save_file(&self.temp_dir, file_path)
            }

            ToolCall::AnalyzeImage { img_path, question } => {
                media::analyze_image(
                    &self.client,
                    &self.settings.model.vision,
                    &self.prompts.media,
                    img_path,
                    question,
                )
                .await
            }
            ToolCall::ExtractTextFromImage { img_path } => {
                media::extract_text_from_image(
                    &self.client,
                    &self.settings.model.vision,
                    &self.prompts.media,
                    img_path,
                )
                .await
            }
            ToolCall::AnalyzeAudio { audio_url, question } => {
                media::analyze_audio(
                    &self.client,
                    &self.http,
                    &self.settings.model.audio,
                    &self.prompts.media,
                    audio_url,
                    question,
                )
                .await
            }

            ToolCall::AnalyzeYoutube { url, question } => {
                youtube::answer_youtube_question(
                    &self.client,
                    &self.settings.model,
                    &self.prompts,
                    &self.temp_dir,
                    url,
                    question,
                )
                .await
            }
        }
    }
}

/// Build one OpenAI tool declaration.
fn declare(
    name: &str,
    description: &str,
    parameters: serde_json::Value,
) -> async_openai::types::ChatCompletionTool {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: name.to_string(),
            description: Some(description.to_string()),
            parameters: Some(parameters),
            strict: None,
        },
    }
}

/// JSON schema for a pair of integer operands.
fn int_pair_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer", "description": "The first integer"},
            "b": {"type": "integer", "description": "The second integer"}
        },
        "required": ["a", "b"]
    })
}

/// JSON schema for a single free-text query.
fn query_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {"type": "string", "description": "The search query"}
        },
        "required": ["query"]
    })
}

/// JSON schema for a file path plus a question about its content.
fn file_question_schema(path_key: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            path_key: {"type": "string", "description": "Path to the file"},
            "question": {"type": "string", "description": "The question to answer about the file"}
        },
        "required": [path_key, "question"]
    })
}

/// Get OpenAI function/tool definitions for the assistant.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    vec![
        declare("add", "Add two integers together.", int_pair_schema()),
        declare(
            "subtract",
            "Subtract the second integer from the first.",
            int_pair_schema(),
        ),
        declare("multiply", "Multiply two integers together.", int_pair_schema()),
        declare(
            "divide",
            "Divide the first integer by the second. Fails if the divisor is zero.",
            int_pair_schema(),
        ),
        declare(
            "web_search",
            "Search the web for a query and return up to 3 results as <Document/> blocks.",
            query_schema(),
        ),
        declare(
            "wiki_search",
            "Search Wikipedia for a query and return up to 2 results as <Document/> blocks.",
            query_schema(),
        ),
        declare(
            "arxiv_search",
            "Search arXiv for a query and return up to 2 results as <Document/> blocks.",
            query_schema(),
        ),
        declare(
            "analyze_csv",
            "Read a CSV file and answer a question about its columns, rows, or summary.",
            file_question_schema("file_path"),
        ),
        declare(
            "analyze_excel",
            "Read an Excel file and answer a question about its columns, rows, or summary.",
            file_question_schema("file_path"),
        ),
        declare(
            "download_file",
            "Download a file from a URL and save it to a temporary location. \
             Returns the path to the downloaded file.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "The URL of the file to download"}
                },
                "required": ["url"]
            }),
        ),
        declare(
            "read_and_save_file",
            "Read a local text file and save a copy to a temporary location. \
             Returns the path to the copy.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": {"type": "string", "description": "Path of the file to read"}
                },
                "required": ["file_path"]
            }),
        ),
        declare(
            "analyze_image",
            "Analyze an image file with a multimodal model and answer a question about it.",
            file_question_schema("img_path"),
        ),
        declare(
            "extract_text_from_image",
            "Extract all text from an image file using a multimodal model.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "img_path": {"type": "string", "description": "Path to the image file"}
                },
                "required": ["img_path"]
            }),
        ),
        declare(
            "analyze_audio",
            "Fetch audio from a URL and answer a question about it using a multimodal model.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "audio_url": {"type": "string", "description": "URL of the audio file"},
                    "question": {"type": "string", "description": "The question to answer about the audio"}
                },
                "required": ["audio_url", "question"]
            }),
        ),
        declare(
            "analyze_youtube",
            "Answer a question about a YouTube video using its transcript, title, and description.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "Full YouTube video URL"},
                    "question": {"type": "string", "description": "The question to answer about the video"}
                },
                "required": ["url", "question"]
            }),
        ),
    ]
}

/// Extract a required string argument.
fn required_str(args: &serde_json::Value, key: &str) -> Result<String> {
    args[key]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| SvarError::Agent(format!("Missing '{}' argument", key)))
}

/// Extract a required integer argument.
fn required_i64(args: &serde_json::Value, key: &str) -> Result<i64> {
    args[key]
        .as_i64()
        .ok_or_else(|| SvarError::Agent(format!("Missing '{}' argument", key)))
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| SvarError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "add" => Ok(ToolCall::Add {
            a: required_i64(&args, "a")?,
            b: required_i64(&args, "b")?,
        }),
        "subtract" => Ok(ToolCall::Subtract {
            a: required_i64(&args, "a")?,
            b: required_i64(&args, "b")?,
        }),
        "multiply" => Ok(ToolCall::Multiply {
            a: required_i64(&args, "a")?,
            b: required_i64(&args, "b")?,
        }),
        "divide" => Ok(ToolCall::Divide {
            a: required_i64(&args, "a")?,
            b: required_i64(&args, "b")?,
        }),
        "web_search" => Ok(ToolCall::WebSearch {
            query: required_str(&args, "query")?,
        }),
        "wiki_search" => Ok(ToolCall::WikiSearch {
            query: required_str(&args, "query")?,
        }),
        "arxiv_search" => Ok(ToolCall::ArxivSearch {
            query: required_str(&args, "query")?,
        }),
        "analyze_csv" => Ok(ToolCall::AnalyzeCsv {
            file_path: required_str(&args, "file_path")?,
            question: required_str(&args, "question")?,
        }),
        "analyze_excel" => Ok(ToolCall::AnalyzeExcel {
            file_path: required_str(&args, "file_path")?,
            question: required_str(&args, "question")?,
        }),
        "download_file" => Ok(ToolCall::DownloadFile {
            url: required_str(&args, "url")?,
        }),
        "read_and_save_file" => Ok(ToolCall::ReadAndSaveFile {
            file_path: required_str(&args, "file_path")?,
        }),
        "analyze_image" => Ok(ToolCall::AnalyzeImage {
            img_path: required_str(&args, "img_path")?,
            question: required_str(&args, "question")?,
        }),
        "extract_text_from_image" => Ok(ToolCall::ExtractTextFromImage {
            img_path: required_str(&args, "img_path")?,
        }),
        "analyze_audio" => Ok(ToolCall::AnalyzeAudio {
            audio_url: required_str(&args, "audio_url")?,
            question: required_str(&args, "question")?,
        }),
        "analyze_youtube" => Ok(ToolCall::AnalyzeYoutube {
            url: required_str(&args, "url")?,
            question: required_str(&args, "question")?,
        }),
        _ => Err(SvarError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Prompts, Settings};

    fn test_context() -> ToolContext {
        let mut settings = Settings::default();
        settings.general.temp_dir = std::env::temp_dir()
            .join("svar-test")
            .to_string_lossy()
            .to_string();
        ToolContext::new(settings, Prompts::default())
    }

    #[test]
    fn test_parse_add_tool() {
        let tool = parse_tool_call("add", r#"{"a": 5, "b": 3}"#).unwrap();
        match tool {
            ToolCall::Add { a, b } => {
                assert_eq!(a, 5);
                assert_eq!(b, 3);
            }
            _ => panic!("Expected Add tool"),
        }
    }

    #[test]
    fn test_parse_search_tool() {
        let tool = parse_tool_call("wiki_search", r#"{"query": "Rust language"}"#).unwrap();
        match tool {
            ToolCall::WikiSearch { query } => assert_eq!(query, "Rust language"),
            _ => panic!("Expected WikiSearch tool"),
        }
    }

    #[test]
    fn test_parse_missing_argument() {
        let result = parse_tool_call("analyze_csv", r#"{"file_path": "data.csv"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unknown_tool() {
        let result = parse_tool_call("teleport", r#"{}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_tool_call("add", "not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_definitions_complete() {
        let definitions = tool_definitions();
        assert_eq!(definitions.len(), 15);

        let mut names: Vec<String> =
            definitions.iter().map(|d| d.function.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 15, "tool names must be unique");
    }

    #[tokio::test]
    async fn test_dispatch_arithmetic() {
        let ctx = test_context();
        assert_eq!(ctx.dispatch("add", r#"{"a": 5, "b": 3}"#).await, "8");
        assert_eq!(ctx.dispatch("multiply", r#"{"a": 5, "b": 3}"#).await, "15");
    }

    #[tokio::test]
    async fn test_dispatch_divide_by_zero_is_a_string() {
        let ctx = test_context();
        let result = ctx.dispatch("divide", r#"{"a": 5, "b": 0}"#).await;
        assert_eq!(result, "Tool error: Cannot divide by zero.");
    }

    #[tokio::test]
    async fn test_dispatch_never_errors() {
        let ctx = test_context();

        // Unknown tool, bad arguments, and adapter failures all come back
        // as non-empty descriptive strings
        let unknown = ctx.dispatch("teleport", r#"{}"#).await;
        assert!(unknown.contains("Unknown tool"));

        let bad_args = ctx.dispatch("add", r#"{"a": 1}"#).await;
        assert!(bad_args.contains("Missing 'b' argument"));

        let missing_file = ctx
            .dispatch("analyze_csv", r#"{"file_path": "/no/such.csv", "question": "rows"}"#)
            .await;
        assert!(!missing_file.is_empty());
        assert!(missing_file.contains("was not found"));
    }
}
