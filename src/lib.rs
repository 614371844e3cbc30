//! Video Frames MCP Server
//!
//! MCP server exposing FFmpeg-based video frame and clip extraction tools:
//!
//! - `extract_frame` - Extract a single frame at a timestamp or frame index
//! - `extract_multiple_frames` - Extract frames at regular intervals
//! - `get_video_info` - Probe duration, resolution, fps, codec, frame count
//! - `extract_clip` - Extract a segment between two timestamps (stream copy)
//!
//! The server itself decodes nothing: each tool validates its inputs, builds
//! an argument vector for ffmpeg/ffprobe, runs the external process, and
//! adapts the result into an MCP response. An optional OCR collaborator can
//! be configured to recognize text in extracted frames.

pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod handler;
pub mod ocr;
pub mod server;
pub mod transport;
pub mod validation;

pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use handler::{
    ExtractClipParams, ExtractFrameParams, ExtractMultipleFramesParams, FrameFormat,
    FrameSelector, GetVideoInfoParams, VideoHandler, VideoInfo,
};
pub use server::VideoFramesServer;
pub use transport::{McpServerBuilder, ServerError, Transport, TransportArgs, TransportMode, shutdown_channel};
