//! YouTube transcript question answering.
//!
//! Fetches video metadata and a json3 caption track with yt-dlp, flattens
//! the captions into plain text, and answers the question with a model call
//! grounded in the transcript. The caption artifact is tracked by exact
//! path and removed on every exit path.

use crate::config::{ModelSettings, Prompts};
use crate::error::{Result, SvarError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Video metadata needed for transcript QA.
#[derive(Debug, Clone)]
struct VideoInfo {
    id: String,
    title: String,
    description: String,
}

/// Classification of a retrieved caption payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    /// No caption track was produced.
    NotFound,
    /// A caption file existed but contained no text.
    Empty,
    /// A caption file existed but was not valid json3.
    Unparseable,
    /// Flattened transcript text, ready for question answering.
    Processed(String),
}

/// json3 timed-caption container: events hold segments, segments hold text.
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(default)]
    segs: Vec<CaptionSeg>,
}

#[derive(Debug, Deserialize)]
struct CaptionSeg {
    utf8: Option<String>,
}

/// Owns the caption file yt-dlp wrote; removes it when dropped.
///
/// The path is the exact file located after download, so cleanup never has
/// to guess candidate names.
struct CaptionArtifact {
    path: PathBuf,
}

impl CaptionArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for CaptionArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if self.path.exists() {
                warn!("Could not remove caption file {:?}: {}", self.path, e);
            }
        } else {
            debug!("Cleaned up caption file {:?}", self.path);
        }
    }
}

/// Answer a question about a YouTube video from its caption transcript.
///
/// Only a successfully processed transcript triggers a model call; the
/// not-found, empty, and unparseable states return their own messages.
#[instrument(skip(client, models, prompts, temp_dir), fields(url = %url))]
pub async fn answer_youtube_question(
    client: &Client<OpenAIConfig>,
    models: &ModelSettings,
    prompts: &Prompts,
    temp_dir: &Path,
    url: &str,
    question: &str,
) -> Result<String> {
    let info = fetch_video_info(url).await?;
    info!("Resolved video {} ({})", info.id, info.title);

    std::fs::create_dir_all(temp_dir)?;
    download_captions(temp_dir, url).await?;

    let caption_file = locate_caption_file(temp_dir, &info.id)?;

    // The guard owns the artifact for the rest of the call; the file is
    // removed on every exit path below, including early returns.
    let _artifact = caption_file.as_ref().map(|p| CaptionArtifact::new(p.clone()));

    let outcome = match &caption_file {
        None => TranscriptOutcome::NotFound,
        Some(path) => {
            let payload = std::fs::read_to_string(path)?;
            classify_transcript(&payload)
        }
    };

    let transcript = match outcome {
        TranscriptOutcome::Processed(text) => text,
        other => {
            return Ok(transcript_failure_message(
                &other,
                caption_file.as_deref(),
                &info.id,
            ))
        }
    };

    let mut vars = HashMap::new();
    vars.insert("title".to_string(), info.title);
    vars.insert("description".to_string(), info.description);
    vars.insert("transcript".to_string(), transcript);
    vars.insert("question".to_string(), question.to_string());

    let user_prompt = prompts.render_with_custom(&prompts.youtube.user, &vars);

    qa_call(
        client,
        &models.transcript,
        models.transcript_temperature,
        &prompts.youtube.system,
        &user_prompt,
    )
    .await
}

/// Fetch title, description, and id via yt-dlp, falling back to manual URL
/// parsing when metadata extraction fails.
async fn fetch_video_info(url: &str) -> Result<VideoInfo> {
    let result = Command::new("yt-dlp")
        .args(["--dump-json", "--no-download", "--no-warnings", "--no-playlist", url])
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("yt-dlp".to_string()));
        }
        Err(e) => {
            return Err(SvarError::VideoSource(format!("Failed to run yt-dlp: {}", e)));
        }
    };

    if !output.status.success() {
        warn!(
            "yt-dlp metadata extraction failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let id = extract_video_id(url).ok_or_else(|| {
            SvarError::VideoSource(format!("Could not extract video ID from URL: {}", url))
        })?;
        return Ok(VideoInfo {
            id,
            title: "Title not found".to_string(),
            description: "Description not found".to_string(),
        });
    }

    let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
        .map_err(|e| SvarError::VideoSource(format!("Failed to parse yt-dlp output: {}", e)))?;

    let id = json["id"]
        .as_str()
        .map(|s| s.to_string())
        .or_else(|| extract_video_id(url))
        .ok_or_else(|| {
            SvarError::VideoSource(format!("Could not extract video ID from URL: {}", url))
        })?;

    Ok(VideoInfo {
        id,
        title: json["title"].as_str().unwrap_or("Title not found").to_string(),
        description: json["description"]
            .as_str()
            .unwrap_or("Description not found")
            .to_string(),
    })
}

/// Extract a video id from the two supported URL shapes or a bare id.
fn extract_video_id(input: &str) -> Option<String> {
    // watch?v= and youtu.be/ URLs, or a bare 11-character id
    let pattern = Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.)?
            (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex");

    let caps = pattern.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Ask yt-dlp for a json3 caption track, preferring English.
///
/// A failed caption download is not fatal; the missing file classifies as
/// the not-found state.
async fn download_captions(temp_dir: &Path, url: &str) -> Result<()> {
    let template = temp_dir.join("%(id)s");

    let result = Command::new("yt-dlp")
        .arg("--skip-download")
        .arg("--write-subs")
        .arg("--write-auto-subs")
        .arg("--sub-langs").arg("en")
        .arg("--sub-format").arg("json3")
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg("--output").arg(&template)
        .arg(url)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("yt-dlp".to_string()));
        }
        Err(e) => {
            return Err(SvarError::VideoSource(format!("Failed to run yt-dlp: {}", e)));
        }
    };

    if !output.status.success() {
        warn!(
            "yt-dlp caption download failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(())
}

/// Locate the caption file yt-dlp produced, preferring the English track.
fn locate_caption_file(dir: &Path, video_id: &str) -> Result<Option<PathBuf>> {
    let english = dir.join(format!("{}.en.json3", video_id));
    if english.exists() {
        return Ok(Some(english));
    }

    // Fall back to any track written for this video
    for entry in std::fs::read_dir(dir)?.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(video_id) && name.ends_with(".json3") {
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}

/// Flatten a json3 payload into transcript text, or classify the failure.
fn classify_transcript(payload: &str) -> TranscriptOutcome {
    let track: CaptionTrack = match serde_json::from_str(payload) {
        Ok(t) => t,
        Err(_) => return TranscriptOutcome::Unparseable,
    };

    let segments: Vec<String> = track
        .events
        .iter()
        .flat_map(|event| event.segs.iter())
        .filter_map(|seg| seg.utf8.as_ref())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if segments.is_empty() {
        TranscriptOutcome::Empty
    } else {
        TranscriptOutcome::Processed(segments.join(" "))
    }
}

/// State-specific message for transcript retrieval failures.
fn transcript_failure_message(
    outcome: &TranscriptOutcome,
    caption_file: Option<&Path>,
    video_id: &str,
) -> String {
    let file_name = caption_file
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    match outcome {
        TranscriptOutcome::NotFound => format!(
            "Transcript not found for video {}. Cannot answer question.",
            video_id
        ),
        TranscriptOutcome::Empty => format!(
            "Transcript file found ({}) but contained no text. Cannot answer question.",
            file_name
        ),
        TranscriptOutcome::Unparseable => format!(
            "Transcript file found ({}) but could not be processed. Cannot answer question.",
            file_name
        ),
        TranscriptOutcome::Processed(_) => {
            "Transcript unavailable for an unknown reason. Cannot answer question.".to_string()
        }
    }
}

/// Single QA model call grounded in the transcript.
async fn qa_call(
    client: &Client<OpenAIConfig>,
    model: &str,
    temperature: f32,
    system: &str,
    user: &str,
) -> Result<String> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(|e| SvarError::OpenAI(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user)
            .build()
            .map_err(|e| SvarError::OpenAI(e.to_string()))?
            .into(),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(temperature)
        .build()
        .map_err(|e| SvarError::OpenAI(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| SvarError::OpenAI(format!("Transcript QA call failed: {}", e)))?;

    let answer = response
        .choices
        .first()
        .and_then(|c| c.message.content.as_ref())
        .ok_or_else(|| SvarError::OpenAI("Empty response from model".to_string()))?;

    Ok(answer.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_classify_transcript_processed() {
        let payload = r#"{
            "events": [
                {"segs": [{"utf8": "Hello"}, {"utf8": " world"}]},
                {"tStartMs": 100},
                {"segs": [{"utf8": "again"}]}
            ]
        }"#;

        match classify_transcript(payload) {
            TranscriptOutcome::Processed(text) => assert_eq!(text, "Hello world again"),
            other => panic!("Expected Processed, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_transcript_empty() {
        assert_eq!(
            classify_transcript(r#"{"events": []}"#),
            TranscriptOutcome::Empty
        );
        assert_eq!(
            classify_transcript(r#"{"events": [{"segs": [{"utf8": "  "}]}]}"#),
            TranscriptOutcome::Empty
        );
        assert_eq!(classify_transcript(r#"{}"#), TranscriptOutcome::Empty);
    }

    #[test]
    fn test_classify_transcript_unparseable() {
        assert_eq!(
            classify_transcript("this is not json"),
            TranscriptOutcome::Unparseable
        );
    }

    #[test]
    fn test_transcript_failure_messages() {
        let not_found =
            transcript_failure_message(&TranscriptOutcome::NotFound, None, "abc12345678");
        assert!(not_found.contains("abc12345678"));

        let path = PathBuf::from("/tmp/abc12345678.en.json3");
        let empty =
            transcript_failure_message(&TranscriptOutcome::Empty, Some(&path), "abc12345678");
        assert!(empty.contains("contained no text"));
        assert!(empty.contains("abc12345678.en.json3"));

        let bad = transcript_failure_message(
            &TranscriptOutcome::Unparseable,
            Some(&path),
            "abc12345678",
        );
        assert!(bad.contains("could not be processed"));
    }

    #[test]
    fn test_caption_artifact_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vid12345678.en.json3");
        std::fs::write(&path, "{}").unwrap();

        {
            let _artifact = CaptionArtifact::new(path.clone());
            assert!(path.exists());
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_locate_caption_file_prefers_english() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vid12345678.de.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("vid12345678.en.json3"), "{}").unwrap();

        let found = locate_caption_file(dir.path(), "vid12345678").unwrap().unwrap();
        assert!(found.to_string_lossy().ends_with("vid12345678.en.json3"));
    }

    #[test]
    fn test_locate_caption_file_fallback_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locate_caption_file(dir.path(), "vid12345678").unwrap().is_none());

        std::fs::write(dir.path().join("vid12345678.de.json3"), "{}").unwrap();
        let found = locate_caption_file(dir.path(), "vid12345678").unwrap().unwrap();
        assert!(found.to_string_lossy().ends_with(".de.json3"));
    }
}
