//! Image and audio analysis tools.
//!
//! Interpretation is delegated entirely to a multimodal model: these
//! adapters read or fetch bytes, encode them for transport, make a single
//! chat call, and return the model's text verbatim (trimmed).

use crate::config::MediaPrompts;
use crate::error::{Result, SvarError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessageContentPartAudioArgs,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageUrlArgs,
    InputAudio, InputAudioFormat,
};
use async_openai::Client;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::{debug, instrument};

/// Analyze an image file and answer a question about it.
#[instrument(skip(client, prompts), fields(img_path = %img_path))]
pub async fn analyze_image(
    client: &Client<OpenAIConfig>,
    model: &str,
    prompts: &MediaPrompts,
    img_path: &str,
    question: &str,
) -> Result<String> {
    let prompt = format!("{}{}", prompts.image_question, question);
    let data_url = image_data_url(img_path)?;
    vision_call(client, model, &prompt, &data_url).await
}

/// Extract all text from an image file.
#[instrument(skip(client, prompts), fields(img_path = %img_path))]
pub async fn extract_text_from_image(
    client: &Client<OpenAIConfig>,
    model: &str,
    prompts: &MediaPrompts,
    img_path: &str,
) -> Result<String> {
    let data_url = image_data_url(img_path)?;
    vision_call(client, model, &prompts.extract_text, &data_url).await
}

/// Fetch audio from a URL and answer a question about it.
#[instrument(skip(client, http, prompts), fields(audio_url = %audio_url))]
pub async fn analyze_audio(
    client: &Client<OpenAIConfig>,
    http: &reqwest::Client,
    model: &str,
    prompts: &MediaPrompts,
    audio_url: &str,
    question: &str,
) -> Result<String> {
    let parsed = url::Url::parse(audio_url).map_err(|e| {
        SvarError::InvalidInput(format!(
            "The provided URL '{}' is invalid: {}. Please provide a complete URL.",
            audio_url, e
        ))
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(SvarError::InvalidInput(format!(
            "The provided URL '{}' is missing the 'http://' or 'https://' protocol. \
             Please provide a complete URL.",
            audio_url
        )));
    }

    let response = http.get(parsed).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    debug!("Fetched {} bytes of audio", bytes.len());

    let audio = InputAudio {
        data: STANDARD.encode(&bytes),
        format: audio_format_from_url(audio_url),
    };

    let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(format!("{}{}", prompts.audio_question, question))
            .build()
            .map_err(|e| SvarError::Media(e.to_string()))?
            .into(),
        ChatCompletionRequestMessageContentPartAudioArgs::default()
            .input_audio(audio)
            .build()
            .map_err(|e| SvarError::Media(e.to_string()))?
            .into(),
    ];

    chat_call(client, model, parts).await
}

/// Make a single vision chat call with a text prompt and a data-URL image.
async fn vision_call(
    client: &Client<OpenAIConfig>,
    model: &str,
    prompt: &str,
    data_url: &str,
) -> Result<String> {
    let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(prompt)
            .build()
            .map_err(|e| SvarError::Media(e.to_string()))?
            .into(),
        ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(data_url)
                    .build()
                    .map_err(|e| SvarError::Media(e.to_string()))?,
            )
            .build()
            .map_err(|e| SvarError::Media(e.to_string()))?
            .into(),
    ];

    chat_call(client, model, parts).await
}

/// Send one user message composed of the given content parts.
async fn chat_call(
    client: &Client<OpenAIConfig>,
    model: &str,
    parts: Vec<ChatCompletionRequestUserMessageContentPart>,
) -> Result<String> {
    let message = ChatCompletionRequestUserMessageArgs::default()
        .content(parts)
        .build()
        .map_err(|e| SvarError::Media(e.to_string()))?;

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(vec![message.into()])
        .build()
        .map_err(|e| SvarError::Media(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| SvarError::OpenAI(format!("Media analysis call failed: {}", e)))?;

    let answer = response
        .choices
        .first()
        .and_then(|c| c.message.content.as_ref())
        .ok_or_else(|| SvarError::OpenAI("Empty response from model".to_string()))?;

    Ok(answer.trim().to_string())
}

/// Read an image file and encode it as a base64 data URL.
fn image_data_url(img_path: &str) -> Result<String> {
    let path = Path::new(img_path);
    if !path.exists() {
        return Err(SvarError::FileNotFound(img_path.to_string()));
    }

    let bytes = std::fs::read(path)?;
    Ok(format!(
        "data:{};base64,{}",
        guess_image_mime(path),
        STANDARD.encode(&bytes)
    ))
}

/// Guess the image MIME type from the file extension, defaulting to PNG.
fn guess_image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Infer the audio container format from the URL path, defaulting to MP3.
fn audio_format_from_url(audio_url: &str) -> InputAudioFormat {
    if audio_url.to_ascii_lowercase().ends_with(".wav") {
        InputAudioFormat::Wav
    } else {
        InputAudioFormat::Mp3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_guess_image_mime() {
        assert_eq!(guess_image_mime(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(guess_image_mime(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(guess_image_mime(Path::new("a.webp")), "image/webp");
        assert_eq!(guess_image_mime(Path::new("screenshot.png")), "image/png");
        assert_eq!(guess_image_mime(Path::new("noext")), "image/png");
    }

    #[test]
    fn test_image_data_url() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

        let data_url = image_data_url(file.path().to_str().unwrap()).unwrap();
        assert!(data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_image_data_url_missing_file() {
        match image_data_url("/nonexistent/image.png") {
            Err(SvarError::FileNotFound(_)) => {}
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_audio_format_from_url() {
        assert!(matches!(
            audio_format_from_url("https://example.com/sound.wav"),
            InputAudioFormat::Wav
        ));
        assert!(matches!(
            audio_format_from_url("https://example.com/song.mp3"),
            InputAudioFormat::Mp3
        ));
    }
}
