//! Configuration module for loading environment variables and settings.

use crate::error::ConfigError;
use std::time::Duration;

/// Default bounded wait for external process invocations, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,
    /// Path or name of the ffprobe binary
    pub ffprobe_path: String,
    /// Optional OCR command line (whitespace-separated argv, never shell-interpreted).
    /// OCR is disabled when unset.
    pub ocr_command: Option<String>,
    /// Bounded wait for external process invocations, in seconds
    pub timeout_secs: u64,
    /// HTTP server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if FFMPEG_TIMEOUT_SECS is set but
    /// not a valid number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let ffmpeg_path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
        let ffprobe_path = std::env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string());

        let ocr_command = std::env::var("OCR_COMMAND")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let timeout_secs = match std::env::var("FFMPEG_TIMEOUT_SECS") {
            Ok(v) => v.parse().map_err(|_| {
                ConfigError::invalid_value(
                    "FFMPEG_TIMEOUT_SECS",
                    format!("'{}' is not a valid number of seconds", v),
                )
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            ocr_command,
            timeout_secs,
            port,
        })
    }

    /// Bounded wait applied to each external process invocation.
    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            ocr_command: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            port: 8080,
        }
    }
}
