//! File transfer tools: download a URL or copy a local file into the
//! configured temp directory, reporting the created path.

use crate::error::{Result, SvarError};
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

/// Download a file from a URL into the temp directory.
///
/// Returns a message naming the saved path so the model can follow up with
/// a file-analysis tool.
#[instrument(skip(http, temp_dir))]
pub async fn download_file(
    http: &reqwest::Client,
    temp_dir: &Path,
    url: &str,
) -> Result<String> {
    std::fs::create_dir_all(temp_dir)?;

    let response = http.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    debug!("Downloaded {} bytes from {}", bytes.len(), url);

    let mut file = tempfile::NamedTempFile::new_in(temp_dir)?;
    file.write_all(&bytes)?;

    let (_, path) = file
        .keep()
        .map_err(|e| SvarError::Download(format!("Could not persist downloaded file: {}", e)))?;

    Ok(format!(
        "File downloaded and saved to {}. Read this file to process its content.",
        path.display()
    ))
}

/// Read a text file and save a copy into the temp directory.
#[instrument(skip(temp_dir))]
pub fn read_and_save_file(temp_dir: &Path, file_path: &str) -> Result<String> {
    if !Path::new(file_path).exists() {
        return Err(SvarError::FileNotFound(file_path.to_string()));
    }

    let content = std::fs::read_to_string(file_path)?;
    std::fs::create_dir_all(temp_dir)?;

    let mut file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile_in(temp_dir)?;
    file.write_all(content.as_bytes())?;

    let (_, path) = file
        .keep()
        .map_err(|e| SvarError::Download(format!("Could not persist file copy: {}", e)))?;

    Ok(format!(
        "File read and saved to {}. Read this file to process its content.",
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_save_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input.txt");
        std::fs::write(&source, "hello from svar").unwrap();

        let message = read_and_save_file(dir.path(), source.to_str().unwrap()).unwrap();
        assert!(message.starts_with("File read and saved to "));

        // The message names a real file containing the copied content
        let saved_path = message
            .trim_start_matches("File read and saved to ")
            .split(". Read this file")
            .next()
            .unwrap();
        let copied = std::fs::read_to_string(saved_path).unwrap();
        assert_eq!(copied, "hello from svar");
    }

    #[test]
    fn test_read_and_save_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match read_and_save_file(dir.path(), "/nonexistent/input.txt") {
            Err(SvarError::FileNotFound(_)) => {}
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_download_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let http = reqwest::Client::new();

        // URL parsing fails before any network I/O happens
        let result = tokio_test::block_on(download_file(&http, dir.path(), "::not-a-url::"));
        assert!(result.is_err());
    }
}
