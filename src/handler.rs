//! Command builders for frame, clip, and metadata operations.
//!
//! Each operation validates its inputs, constructs an ffmpeg/ffprobe argument
//! list, delegates to the [`MediaRunner`] gateway, and post-processes the
//! result. Every call is independent and stateless.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ffmpeg::{self, MediaRunner, SystemRunner};
use crate::validation::{is_image_file, is_valid_timestamp, is_video_file};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Default sampling interval for multi-frame extraction, in seconds.
pub const DEFAULT_INTERVAL_SECONDS: f64 = 1.0;

/// Zero-padded filename prefix for multi-frame extraction output.
const FRAME_PREFIX: &str = "frame_";

// =============================================================================
// Parameter Types
// =============================================================================

/// Parameters for extracting a single frame.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractFrameParams {
    /// Absolute path to the video file.
    pub video_path: String,
    /// Path for the output image (.jpg, .png, ...). A temporary file is
    /// synthesized and cleaned up when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Timestamp to extract (HH:MM:SS or seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Specific frame number to extract (0-indexed). Ignored when a
    /// timestamp is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u64>,
}

/// Parameters for extracting multiple frames at regular intervals.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractMultipleFramesParams {
    /// Absolute path to the video file.
    pub video_path: String,
    /// Directory where extracted frames will be saved. A temporary directory
    /// is synthesized and cleaned up when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Extract a frame every N seconds. Default: 1.
    #[serde(default = "default_interval")]
    pub interval_seconds: f64,
    /// Extract exactly N frames evenly distributed. Overrides intervalSeconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
    /// Output image format. Default: jpg.
    #[serde(default)]
    pub format: FrameFormat,
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_SECONDS
}

/// Output image format for multi-frame extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Jpg,
    Png,
}

impl FrameFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Jpg => "jpg",
            FrameFormat::Png => "png",
        }
    }
}

/// Parameters for extracting a clip between two timestamps.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractClipParams {
    /// Absolute path to the video file.
    pub video_path: String,
    /// Absolute path for the output video file.
    pub output_path: String,
    /// Start timestamp (HH:MM:SS or seconds).
    pub start_time: String,
    /// End timestamp (HH:MM:SS or seconds). Optional if duration is provided;
    /// takes precedence when both are given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Duration in seconds. Optional if endTime is provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Parameters for probing video metadata.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetVideoInfoParams {
    /// Absolute path to the video file.
    pub video_path: String,
}

// =============================================================================
// Output Types
// =============================================================================

/// Video metadata reported by ffprobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Frame width in pixels, zero if undetected.
    pub width: u32,
    /// Frame height in pixels, zero if undetected.
    pub height: u32,
    /// Frames per second, rounded to 2 decimal places.
    pub fps: f64,
    /// Codec name of the video stream.
    pub codec: String,
    /// Bitrate in bits per second, zero if undetected.
    pub bitrate: u64,
    /// Total frame count. Reported by the stream when available, otherwise
    /// computed as floor(duration x fps), which can diverge from the true
    /// count for variable-frame-rate media.
    pub frame_count: u64,
}

// =============================================================================
// Frame Selection
// =============================================================================

/// Which frame a single-frame extraction grabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSelector {
    /// Seek to a timestamp, then take one frame.
    ByTimestamp(String),
    /// Select the frame at a zero-based stream index.
    ByIndex(u64),
    /// The first frame of the stream.
    First,
}

impl FrameSelector {
    /// Resolve the selector from optional request fields. A timestamp takes
    /// precedence over a frame index; with neither, frame 0 is used.
    pub fn from_params(timestamp: Option<&str>, frame_index: Option<u64>) -> Self {
        match (timestamp, frame_index) {
            (Some(ts), _) => FrameSelector::ByTimestamp(ts.to_string()),
            (None, Some(index)) => FrameSelector::ByIndex(index),
            (None, None) => FrameSelector::First,
        }
    }

    /// Append the input and selection arguments for a single-frame grab.
    fn push_args(&self, video_path: &str, args: &mut Vec<String>) {
        match self {
            FrameSelector::ByTimestamp(ts) => {
                // Seeking before -i is fast; one output frame from there.
                args.extend([
                    "-ss".to_string(),
                    ts.clone(),
                    "-i".to_string(),
                    video_path.to_string(),
                    "-frames:v".to_string(),
                    "1".to_string(),
                ]);
            }
            FrameSelector::ByIndex(index) => {
                args.extend([
                    "-i".to_string(),
                    video_path.to_string(),
                    "-vf".to_string(),
                    format!("select=eq(n\\,{})", index),
                    "-vframes".to_string(),
                    "1".to_string(),
                ]);
            }
            FrameSelector::First => {
                args.extend([
                    "-i".to_string(),
                    video_path.to_string(),
                    "-vf".to_string(),
                    "select=eq(n\\,0)".to_string(),
                    "-vframes".to_string(),
                    "1".to_string(),
                ]);
            }
        }
    }
}

// =============================================================================
// VideoHandler
// =============================================================================

/// Handler for FFmpeg-based frame and clip extraction.
pub struct VideoHandler {
    runner: Arc<dyn MediaRunner>,
}

impl VideoHandler {
    /// Create a new handler backed by the system ffmpeg/ffprobe binaries.
    pub fn new(config: &Config) -> Self {
        Self {
            runner: Arc::new(SystemRunner::new(config)),
        }
    }

    /// Create a handler with an injected runner (for testing).
    pub fn with_runner(runner: Arc<dyn MediaRunner>) -> Self {
        Self { runner }
    }

    /// Extract a single frame to `output_path`.
    ///
    /// Selection strategies are mutually exclusive: a timestamp seeks and
    /// takes one frame; a frame index selects that frame from the stream;
    /// with neither, frame 0 is extracted.
    #[instrument(level = "info", skip(self))]
    pub async fn extract_frame(
        &self,
        params: &ExtractFrameParams,
        output_path: &Path,
    ) -> Result<PathBuf> {
        let video = Path::new(&params.video_path);
        if !ffmpeg::path_exists(video) {
            return Err(Error::validation(format!(
                "Video file not found: {}",
                params.video_path
            )));
        }
        if !is_video_file(video) {
            return Err(Error::validation(format!(
                "Not a valid video file: {}",
                params.video_path
            )));
        }
        if !is_image_file(output_path) {
            return Err(Error::validation(format!(
                "Output must be an image file (.jpg, .png, ...): {}",
                output_path.display()
            )));
        }
        if let Some(ts) = &params.timestamp {
            if !is_valid_timestamp(ts) {
                return Err(Error::validation(format!("Invalid timestamp format: {}", ts)));
            }
        }

        ffmpeg::ensure_parent_dir(output_path).await?;

        let selector = FrameSelector::from_params(params.timestamp.as_deref(), params.frame_index);
        let mut args = base_args();
        selector.push_args(&params.video_path, &mut args);
        args.push(output_path.to_string_lossy().into_owned());

        self.runner.run_ffmpeg(&args).await?;

        // ffmpeg can exit 0 yet produce nothing under some codec/seek
        // combinations; the existence check is the safety net.
        if !ffmpeg::path_exists(output_path) {
            return Err(Error::extraction(format!(
                "ffmpeg produced no output at {}",
                output_path.display()
            )));
        }

        info!(output = %output_path.display(), "Extracted frame");
        Ok(output_path.to_path_buf())
    }

    /// Extract multiple frames into `output_dir`, returning the produced
    /// paths sorted by sequence number.
    ///
    /// With `total_frames` set, the sampling rate is totalFrames/duration
    /// (probed); otherwise one frame every `interval_seconds`. A total that
    /// resolves to a non-positive rate is passed through to ffmpeg unguarded.
    #[instrument(level = "info", skip(self))]
    pub async fn extract_multiple_frames(
        &self,
        params: &ExtractMultipleFramesParams,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let video = Path::new(&params.video_path);
        if !ffmpeg::path_exists(video) {
            return Err(Error::validation(format!(
                "Video file not found: {}",
                params.video_path
            )));
        }
        if !is_video_file(video) {
            return Err(Error::validation(format!(
                "Not a valid video file: {}",
                params.video_path
            )));
        }

        ffmpeg::ensure_dir(output_dir).await?;

        let mut args = base_args();
        args.extend(["-i".to_string(), params.video_path.clone()]);

        if let Some(total) = params.total_frames {
            let duration = self.probe_duration(&params.video_path).await?;
            let rate = total as f64 / duration;
            args.extend(["-vf".to_string(), format!("fps={}", rate)]);
        } else {
            args.extend([
                "-vf".to_string(),
                format!("fps=1/{}", params.interval_seconds),
            ]);
        }

        let extension = params.format.extension();
        let pattern = output_dir.join(format!("{}%04d.{}", FRAME_PREFIX, extension));
        args.push(pattern.to_string_lossy().into_owned());

        self.runner.run_ffmpeg(&args).await?;

        let frames = list_frames(output_dir, extension).await?;
        info!(count = frames.len(), dir = %output_dir.display(), "Extracted frames");
        Ok(frames)
    }

    /// Probe structured metadata for a video file.
    #[instrument(level = "info", skip(self))]
    pub async fn get_video_info(&self, params: &GetVideoInfoParams) -> Result<VideoInfo> {
        let video = Path::new(&params.video_path);
        if !ffmpeg::path_exists(video) {
            return Err(Error::validation(format!(
                "Video file not found: {}",
                params.video_path
            )));
        }
        if !is_video_file(video) {
            return Err(Error::validation(format!(
                "Not a valid video file: {}",
                params.video_path
            )));
        }

        let args = probe_args(&params.video_path, true);
        let output = self.runner.run_ffprobe(&args).await?;
        parse_video_info(&output)
    }

    /// Extract a clip between two timestamps using stream copy.
    ///
    /// Stream copy skips re-encoding for speed, so cut boundaries snap to the
    /// nearest preceding keyframe and are not frame-accurate. When both
    /// endTime and duration are given, endTime wins.
    #[instrument(level = "info", skip(self))]
    pub async fn extract_clip(&self, params: &ExtractClipParams) -> Result<PathBuf> {
        let video = Path::new(&params.video_path);
        let output = Path::new(&params.output_path);

        if !ffmpeg::path_exists(video) {
            return Err(Error::validation(format!(
                "Video file not found: {}",
                params.video_path
            )));
        }
        if !is_video_file(video) {
            return Err(Error::validation(format!(
                "Not a valid video file: {}",
                params.video_path
            )));
        }
        if !is_valid_timestamp(&params.start_time) {
            return Err(Error::validation(format!(
                "Invalid start timestamp: {}",
                params.start_time
            )));
        }
        if let Some(end) = &params.end_time {
            if !is_valid_timestamp(end) {
                return Err(Error::validation(format!("Invalid end timestamp: {}", end)));
            }
        }
        if params.end_time.is_none() && params.duration.is_none() {
            return Err(Error::validation("Must provide either endTime or duration"));
        }
        if !is_video_file(output) {
            return Err(Error::validation(format!(
                "Output must be a video file: {}",
                params.output_path
            )));
        }

        ffmpeg::ensure_parent_dir(output).await?;

        let mut args = base_args();
        // -ss before -i seeks on the input for speed.
        args.extend([
            "-ss".to_string(),
            params.start_time.clone(),
            "-i".to_string(),
            params.video_path.clone(),
        ]);

        if let Some(end) = &params.end_time {
            args.extend(["-to".to_string(), end.clone()]);
        } else if let Some(duration) = params.duration {
            args.extend(["-t".to_string(), duration.to_string()]);
        }

        args.extend([
            "-c".to_string(),
            "copy".to_string(),
            params.output_path.clone(),
        ]);

        self.runner.run_ffmpeg(&args).await?;

        if !ffmpeg::path_exists(output) {
            return Err(Error::extraction(format!(
                "ffmpeg produced no output at {}",
                params.output_path
            )));
        }

        info!(output = %params.output_path, "Extracted clip");
        Ok(output.to_path_buf())
    }

    /// Probe just the container duration, for computing an even sampling rate.
    async fn probe_duration(&self, video_path: &str) -> Result<f64> {
        let args = probe_args(video_path, false);
        let output = self.runner.run_ffprobe(&args).await?;
        let data: serde_json::Value = serde_json::from_str(&output)
            .map_err(|e| Error::parse(format!("ffprobe output is not valid JSON: {}", e)))?;
        data.get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::parse("ffprobe output has no format.duration"))
    }
}

// =============================================================================
// Argument and Output Helpers
// =============================================================================

/// Shared ffmpeg argument prefix: quiet output, overwrite existing files.
fn base_args() -> Vec<String> {
    ["-hide_banner", "-loglevel", "error", "-y"]
        .map(String::from)
        .to_vec()
}

/// ffprobe arguments for a JSON metadata query.
fn probe_args(video_path: &str, show_streams: bool) -> Vec<String> {
    let mut args = ["-v", "quiet", "-print_format", "json", "-show_format"]
        .map(String::from)
        .to_vec();
    if show_streams {
        args.push("-show_streams".to_string());
    }
    args.push(video_path.to_string());
    args
}

/// Parse ffprobe JSON into [`VideoInfo`].
fn parse_video_info(output: &str) -> Result<VideoInfo> {
    let data: serde_json::Value = serde_json::from_str(output)
        .map_err(|e| Error::parse(format!("ffprobe output is not valid JSON: {}", e)))?;

    let stream = data
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.get("codec_type").and_then(|c| c.as_str()) == Some("video"))
        })
        .ok_or_else(|| Error::parse("no video stream found"))?;

    let format = data.get("format");
    let duration: f64 = format
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let bitrate: u64 = format
        .and_then(|f| f.get("bit_rate"))
        .and_then(|b| b.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let rate = stream
        .get("r_frame_rate")
        .and_then(|r| r.as_str())
        .unwrap_or("0/1");
    let fps = parse_frame_rate(rate)?;

    let frame_count = stream
        .get("nb_frames")
        .and_then(|n| n.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| (duration * fps).floor() as u64);

    Ok(VideoInfo {
        duration,
        width: stream.get("width").and_then(|w| w.as_u64()).unwrap_or(0) as u32,
        height: stream.get("height").and_then(|h| h.as_u64()).unwrap_or(0) as u32,
        fps,
        codec: stream
            .get("codec_name")
            .and_then(|c| c.as_str())
            .unwrap_or("unknown")
            .to_string(),
        bitrate,
        frame_count,
    })
}

/// Parse a rational frame rate like "30/1" or "30000/1001", rounded to two
/// decimal places. A zero denominator yields 0.0.
fn parse_frame_rate(rate: &str) -> Result<f64> {
    let (numerator, denominator) = rate
        .split_once('/')
        .ok_or_else(|| Error::parse(format!("unexpected frame rate '{}'", rate)))?;
    let numerator: f64 = numerator
        .parse()
        .map_err(|_| Error::parse(format!("unexpected frame rate '{}'", rate)))?;
    let denominator: f64 = denominator
        .parse()
        .map_err(|_| Error::parse(format!("unexpected frame rate '{}'", rate)))?;
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok((numerator / denominator * 100.0).round() / 100.0)
}

/// List produced frame files in a directory, sorted by sequence number
/// (lexicographic order equals numeric order with zero-padded names).
async fn list_frames(output_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension);
    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(FRAME_PREFIX) && name.ends_with(&suffix) {
            frames.push(entry.path());
        }
    }
    frames.sort();
    Ok(frames)
}

// =============================================================================
// Unit Tests
// =============================================================================
