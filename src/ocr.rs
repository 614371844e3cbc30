//! Optional OCR collaborator.
//!
//! OCR is an enhancement, not a guarantee: the façade feeds extracted frame
//! bytes to a configured engine and appends any recognized text, but failures
//! are logged and swallowed, never surfaced as tool errors. The engine itself
//! is an opaque external command driven over stdin/stdout with the same
//! argument-vector discipline as the ffmpeg gateway.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Text recognition over raw image bytes.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an encoded image. Returns the recognized text,
    /// possibly empty.
    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// [`OcrEngine`] backed by an external command reading the image from stdin
/// and writing text to stdout (e.g. `tesseract stdin stdout`).
pub struct CommandOcr {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandOcr {
    /// Build from a whitespace-separated command line. No shell quoting is
    /// supported; the pieces become the argument vector as-is. Returns None
    /// for an empty line.
    pub fn from_command_line(line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }
}

#[async_trait]
impl OcrEngine for CommandOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String> {
        debug!(program = %self.program, bytes = image.len(), "Running OCR");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::process(format!("failed to start '{}': {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::process("OCR stdin unavailable"))?;

        // Feed stdin while collecting output; writing the whole image first
        // would deadlock once the engine fills its stdout pipe.
        let feed = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };
        let (written, output) =
            tokio::time::timeout(self.timeout, async { tokio::join!(feed, child.wait_with_output()) })
                .await
                .map_err(|_| Error::timeout(self.timeout.as_secs()))?;
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::process(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        written?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line_splits_argv() {
        let ocr = CommandOcr::from_command_line("tesseract stdin stdout -l eng", Duration::from_secs(5))
            .unwrap();
        assert_eq!(ocr.program, "tesseract");
        assert_eq!(ocr.args, vec!["stdin", "stdout", "-l", "eng"]);
    }

    #[test]
    fn test_from_command_line_empty_is_none() {
        assert!(CommandOcr::from_command_line("", Duration::from_secs(5)).is_none());
        assert!(CommandOcr::from_command_line("   ", Duration::from_secs(5)).is_none());
    }

    #[tokio::test]
    async fn test_recognize_trims_stdout() {
        // `cat` echoes the image bytes back; close enough for plumbing checks.
        let ocr = CommandOcr::from_command_line("cat", Duration::from_secs(5)).unwrap();
        let text = ocr.recognize(b"  hello frame \n").await.unwrap();
        assert_eq!(text, "hello frame");
    }

    #[tokio::test]
    async fn test_recognize_missing_binary_is_process_error() {
        let ocr = CommandOcr::from_command_line(
            "definitely-not-a-real-binary-9f3a",
            Duration::from_secs(5),
        )
        .unwrap();
        let err = ocr.recognize(b"image").await.unwrap_err();
        assert!(matches!(err, Error::Process(_)), "got {:?}", err);
    }
}
