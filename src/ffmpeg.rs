//! Process gateway for the FFmpeg and FFprobe binaries.
//!
//! Every invocation is argument-vector execution via [`tokio::process::Command`],
//! never a shell string, so arguments containing shell metacharacters are never
//! interpretable as shell syntax. The [`MediaRunner`] trait is the seam for
//! unit-testing command builders without invoking real binaries.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Executor for the transcoder and prober binaries.
#[async_trait]
pub trait MediaRunner: Send + Sync {
    /// Execute ffmpeg with the given argument list. Returns captured stdout,
    /// falling back to stderr when stdout is empty (ffmpeg logs there).
    async fn run_ffmpeg(&self, args: &[String]) -> Result<String>;

    /// Execute ffprobe with the given argument list. Returns stdout only,
    /// expected to be well-formed JSON for `-print_format json` queries.
    async fn run_ffprobe(&self, args: &[String]) -> Result<String>;
}

/// [`MediaRunner`] backed by the system ffmpeg/ffprobe binaries.
pub struct SystemRunner {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

impl SystemRunner {
    /// Create a runner using the binaries and timeout from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg: config.ffmpeg_path.clone(),
            ffprobe: config.ffprobe_path.clone(),
            timeout: config.process_timeout(),
        }
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<std::process::Output> {
        debug!(program, ?args, "Running external process");

        let invocation = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = tokio::time::timeout(self.timeout, invocation)
            .await
            .map_err(|_| Error::timeout(self.timeout.as_secs()))?
            .map_err(|e| Error::process(format!("failed to start '{}': {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::process(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaRunner for SystemRunner {
    async fn run_ffmpeg(&self, args: &[String]) -> Result<String> {
        let output = self.run(&self.ffmpeg, args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.is_empty() {
            Ok(String::from_utf8_lossy(&output.stderr).into_owned())
        } else {
            Ok(stdout.into_owned())
        }
    }

    async fn run_ffprobe(&self, args: &[String]) -> Result<String> {
        let output = self.run(&self.ffprobe, args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Probe for the presence of a binary with a trivial `-version` invocation.
/// Returns false on any failure, never errors.
pub async fn check_available(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of a file path exists (idempotent).
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Ensure a directory exists, creating it recursively if needed (idempotent).
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

/// Check if a file or directory exists at the given path.
pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_available_missing_binary() {
        assert!(!check_available("definitely-not-a-real-binary-9f3a").await);
    }

    #[tokio::test]
    async fn test_run_missing_binary_is_process_error() {
        let runner = SystemRunner {
            ffmpeg: "definitely-not-a-real-binary-9f3a".to_string(),
            ffprobe: "definitely-not-a-real-binary-9f3a".to_string(),
            timeout: Duration::from_secs(5),
        };
        let err = runner.run_ffmpeg(&["-version".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Process(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/frame.jpg");
        ensure_parent_dir(&file).await.unwrap();
        ensure_parent_dir(&file).await.unwrap();
        assert!(file.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_bare_filename() {
        // A bare filename has an empty parent; nothing to create.
        ensure_parent_dir(Path::new("frame.jpg")).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("frames/out");
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(path_exists(&nested));
    }
}
