//! Error types for the video-frames MCP server.
//!
//! This module provides a unified error hierarchy using `thiserror` so every
//! tool call reports failures consistently at the MCP boundary.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration
//! - `Error::Validation`: Bad paths, extensions, or timestamp syntax, caught
//!   before any external process starts
//! - `Error::Process`: FFmpeg/FFprobe missing or exited non-zero (includes
//!   captured stderr)
//! - `Error::Extraction`: The external tool exited cleanly but the expected
//!   output file was never created
//! - `Error::Parse`: FFprobe output was not valid JSON, or held no video stream
//! - `Error::Io`: File system operations
//! - `Error::Timeout`: External process exceeded the configured wait

use thiserror::Error;

/// Unified error type for the video-frames MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors, raised before any external process starts
    #[error("Validation error: {0}")]
    Validation(String),

    /// FFmpeg/FFprobe execution errors (binary missing or non-zero exit)
    #[error("Process error: {0}")]
    Process(String),

    /// The external tool exited cleanly but produced no output file
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// FFprobe output could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// External process timeout
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),
}

impl Error {
    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use video_frames_mcp::error::Error;
    ///
    /// let err = Error::validation("Invalid timestamp format: 1:2:3:4");
    /// assert!(err.to_string().contains("1:2:3:4"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Create a new process error. The message should carry the captured
    /// stderr so callers can diagnose the failure.
    pub fn process(message: impl Into<String>) -> Self {
        Error::Process(message.into())
    }

    /// Create a new extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Error::Extraction(message.into())
    }

    /// Create a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Create a new timeout error.
    pub fn timeout(seconds: u64) -> Self {
        Error::Timeout(seconds)
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
