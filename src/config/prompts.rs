//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub youtube: YoutubePrompts,
    pub media: MediaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for the conversation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant with access to a set of tools: arithmetic, web search, Wikipedia search, arXiv search, CSV and Excel analysis, file download, and image/audio/YouTube analysis.

Think step-by-step about what information you need, then use the appropriate tools.

Guidelines:
- Use the arithmetic tools for exact calculations instead of computing in your head
- Use 'web_search' for current events and general web content
- Use 'wiki_search' for encyclopedic facts
- Use 'arxiv_search' for academic papers
- Use 'analyze_csv' or 'analyze_excel' when the user provides a spreadsheet path
- Use 'download_file' to fetch a URL to a local file before analyzing it
- Use 'analyze_image', 'analyze_audio', or 'analyze_youtube' for media questions

When you have gathered enough information, provide your final answer directly.
Be concise and factual. If a tool reports an error, tell the user what went wrong instead of guessing."#
                .to_string(),
        }
    }
}

/// Prompts for YouTube transcript question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubePrompts {
    pub system: String,
    pub user: String,
}

impl Default for YoutubePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an assistant designed to answer questions about a YouTube video based only on its provided transcript, title, and description.

If the answer cannot be found in the transcript or the provided context, state that clearly (e.g., "The transcript does not contain information about..."). Do not make assumptions or use external knowledge. Provide a concise answer."#
                .to_string(),

            user: r#"Video Title: {{title}}
Video Description: {{description}}

Video Transcript:
---
{{transcript}}
---

Based only on the information provided above (primarily the transcript), answer the following question:
Question: {{question}}"#
                .to_string(),
        }
    }
}

/// Prompts for image and audio analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaPrompts {
    /// Prefix for image analysis questions.
    pub image_question: String,
    /// Instruction for plain text extraction from images.
    pub extract_text: String,
    /// Prefix for audio analysis questions.
    pub audio_question: String,
}

impl Default for MediaPrompts {
    fn default() -> Self {
        Self {
            image_question: "Analyze the image and answer the following question: ".to_string(),
            extract_text: "Extract all the text from this image. \
                Return only the extracted text, no explanations."
                .to_string(),
            audio_question: "Analyze the audio and answer the following question: ".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load agent prompts if file exists
            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            // Load YouTube prompts if file exists
            let youtube_path = custom_path.join("youtube.toml");
            if youtube_path.exists() {
                let content = std::fs::read_to_string(&youtube_path)?;
                prompts.youtube = toml::from_str(&content)?;
            }

            // Load media prompts if file exists
            let media_path = custom_path.join("media.toml");
            if media_path.exists() {
                let content = std::fs::read_to_string(&media_path)?;
                prompts.media = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.agent.system.is_empty());
        assert!(prompts.youtube.user.contains("{{transcript}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Title: {{title}}, Question: {{question}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("title".to_string(), "Demo".to_string());
        vars.insert("question".to_string(), "Why?".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Title: Demo, Question: Why?");
    }
}
