//! Video Frames MCP Server
//!
//! MCP server for video frame and clip extraction using FFmpeg.
//!
//! # Tools
//!
//! - `extract_frame` - Extract a single frame at a timestamp or frame index
//! - `extract_multiple_frames` - Extract frames at regular intervals
//! - `get_video_info` - Probe video metadata
//! - `extract_clip` - Extract a segment between two timestamps
//!
//! # Usage
//!
//! ```bash
//! # Run with stdio transport (default)
//! video-frames-mcp
//!
//! # Run with HTTP transport
//! video-frames-mcp --transport http --port 8080
//! ```

use anyhow::Result;
use clap::Parser;
use video_frames_mcp::{Config, McpServerBuilder, TransportArgs, VideoFramesServer, ffmpeg};

#[derive(Parser, Debug)]
#[command(name = "video-frames-mcp")]
#[command(about = "MCP server for video frame and clip extraction using FFmpeg")]
#[command(version)]
struct Args {
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr: stdout carries the MCP JSON-RPC channel in stdio mode.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?;

    if !ffmpeg::check_available(&config.ffmpeg_path).await {
        anyhow::bail!(
            "ffmpeg is not installed or not in PATH (checked '{}'). \
             Install it with your package manager, e.g. `apt install ffmpeg` \
             or `brew install ffmpeg`",
            config.ffmpeg_path
        );
    }

    tracing::info!(
        ffmpeg = %config.ffmpeg_path,
        ffprobe = %config.ffprobe_path,
        ocr = config.ocr_command.is_some(),
        "Starting video-frames-mcp server"
    );

    // Create server
    let server = VideoFramesServer::new(&config);

    // Get transport configuration
    let transport = args.transport.into_transport();

    // Run server
    McpServerBuilder::new(server)
        .with_transport(transport)
        .run()
        .await?;

    Ok(())
}
