//! Configuration settings for Svar.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub agent: AgentSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files (downloads, caption artifacts).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/svar".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Model selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model used for the conversation loop and tool selection.
    pub chat: String,
    /// Vision-capable model for image analysis.
    pub vision: String,
    /// Audio-capable model for audio analysis.
    pub audio: String,
    /// Model for transcript question answering.
    pub transcript: String,
    /// Sampling temperature for transcript QA (kept low for factual answers).
    pub transcript_temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            chat: "gpt-4o-mini".to_string(),
            vision: "gpt-4o-mini".to_string(),
            audio: "gpt-4o-audio-preview".to_string(),
            transcript: "gpt-4o-mini".to_string(),
            transcript_temperature: 0.0,
        }
    }
}

/// Search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Tavily API key. Falls back to the TAVILY_API_KEY environment variable.
    pub tavily_api_key: Option<String>,
    /// Maximum web search results.
    pub max_web_results: usize,
    /// Maximum Wikipedia results.
    pub max_wiki_results: usize,
    /// Maximum arXiv results.
    pub max_arxiv_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            max_web_results: 3,
            max_wiki_results: 2,
            max_arxiv_results: 2,
        }
    }
}

impl SearchSettings {
    /// Resolve the Tavily API key from settings or environment.
    pub fn tavily_key(&self) -> Option<String> {
        self.tavily_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("TAVILY_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum assistant/tool iterations per task.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_iterations: 15 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SvarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svar")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.search.max_web_results, 3);
        assert_eq!(settings.search.max_wiki_results, 2);
        assert_eq!(settings.agent.max_iterations, 15);
    }

    #[test]
    fn test_roundtrip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.chat, settings.model.chat);
    }
}
