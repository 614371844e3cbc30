//! Integration tests for the video-frames MCP server.
//!
//! These tests require FFmpeg and FFprobe to be installed on the system.
//!
//! Run with: `cargo test --test integration_test`
//! Skip in CI: `cargo test --lib`
//!
//! Test fixtures are synthesized with FFmpeg's lavfi test sources into a
//! scratch directory that is removed when each test finishes.

use std::process::Command;
use tempfile::TempDir;
use video_frames_mcp::{
    Config, ExtractClipParams, ExtractFrameParams, ExtractMultipleFramesParams,
    GetVideoInfoParams, VideoFramesServer, VideoHandler, VideoInfo,
};

/// Check if FFmpeg is available on the system.
fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check if FFprobe is available on the system.
fn ffprobe_available() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check if integration tests should run.
fn should_run_integration_tests() -> bool {
    if std::env::var("SKIP_INTEGRATION_TESTS").is_ok() {
        return false;
    }
    ffmpeg_available() && ffprobe_available()
}

/// Macro to skip a test if integration tests are disabled.
macro_rules! skip_if_no_integration {
    () => {
        if !should_run_integration_tests() {
            eprintln!("Skipping integration test: FFmpeg/FFprobe not available");
            return;
        }
    };
}

/// Create a test video file using FFmpeg's testsrc source.
fn create_test_video(path: &std::path::Path, duration: f32) -> bool {
    Command::new("ffmpeg")
        .args([
            "-y",
            "-f",
            "lavfi",
            "-i",
            &format!("testsrc=duration={}:size=320x240:rate=10", duration),
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            path.to_str().unwrap(),
        ])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

struct Fixture {
    dir: TempDir,
    video: String,
}

impl Fixture {
    fn new(duration: f32) -> Self {
        let dir = TempDir::new().expect("Failed to create scratch directory");
        let video_path = dir.path().join("testsrc.mp4");
        assert!(
            create_test_video(&video_path, duration),
            "Failed to synthesize test video"
        );
        Self {
            video: video_path.to_string_lossy().into_owned(),
            dir,
        }
    }

    fn handler(&self) -> VideoHandler {
        VideoHandler::new(&Config::default())
    }
}

#[tokio::test]
async fn test_extract_frame_produces_image() {
    skip_if_no_integration!();

    let fixture = Fixture::new(2.0);
    let output = fixture.dir.path().join("frame.jpg");

    let params = ExtractFrameParams {
        video_path: fixture.video.clone(),
        output_path: None,
        timestamp: Some("1".to_string()),
        frame_index: None,
    };
    let result = fixture
        .handler()
        .extract_frame(&params, &output)
        .await
        .expect("Frame extraction failed");

    assert_eq!(result, output);
    let metadata = std::fs::metadata(&output).unwrap();
    assert!(metadata.len() > 0, "Extracted frame is empty");
}

#[tokio::test]
async fn test_extract_frame_defaults_to_first_frame() {
    skip_if_no_integration!();

    let fixture = Fixture::new(1.0);
    let output = fixture.dir.path().join("first.png");

    let params = ExtractFrameParams {
        video_path: fixture.video.clone(),
        output_path: None,
        timestamp: None,
        frame_index: None,
    };
    fixture
        .handler()
        .extract_frame(&params, &output)
        .await
        .expect("Default first-frame extraction failed");

    assert!(output.exists());
}

#[tokio::test]
async fn test_extract_multiple_frames_interval() {
    skip_if_no_integration!();

    let fixture = Fixture::new(3.0);
    let out_dir = fixture.dir.path().join("frames");

    let params = ExtractMultipleFramesParams {
        video_path: fixture.video.clone(),
        output_dir: None,
        interval_seconds: 1.0,
        total_frames: None,
        format: Default::default(),
    };
    let frames = fixture
        .handler()
        .extract_multiple_frames(&params, &out_dir)
        .await
        .expect("Multi-frame extraction failed");

    assert!(
        frames.len() >= 2,
        "Expected at least 2 frames from a 3s video at 1 fps, got {}",
        frames.len()
    );
    // Sorted ascending by sequence number.
    let mut sorted = frames.clone();
    sorted.sort();
    assert_eq!(frames, sorted);
    for frame in &frames {
        assert!(frame.exists());
    }
}

#[tokio::test]
async fn test_get_video_info_reports_fixture_properties() {
    skip_if_no_integration!();

    let fixture = Fixture::new(2.0);
    let info: VideoInfo = fixture
        .handler()
        .get_video_info(&GetVideoInfoParams {
            video_path: fixture.video.clone(),
        })
        .await
        .expect("Probe failed");

    assert_eq!(info.width, 320);
    assert_eq!(info.height, 240);
    assert_eq!(info.fps, 10.0);
    assert_eq!(info.codec, "h264");
    assert!(
        (info.duration - 2.0).abs() < 0.5,
        "Unexpected duration {}",
        info.duration
    );
    assert!(info.frame_count >= 15, "Unexpected frame count {}", info.frame_count);
}

#[tokio::test]
async fn test_extract_clip_with_duration() {
    skip_if_no_integration!();

    let fixture = Fixture::new(3.0);
    let output = fixture.dir.path().join("clip.mp4");

    let params = ExtractClipParams {
        video_path: fixture.video.clone(),
        output_path: output.to_string_lossy().into_owned(),
        start_time: "0".to_string(),
        end_time: None,
        duration: Some(1.0),
    };
    fixture
        .handler()
        .extract_clip(&params)
        .await
        .expect("Clip extraction failed");

    assert!(output.exists());

    // The clip should probe as a shorter video than the source.
    let info = fixture
        .handler()
        .get_video_info(&GetVideoInfoParams {
            video_path: output.to_string_lossy().into_owned(),
        })
        .await
        .expect("Probe of extracted clip failed");
    assert!(
        info.duration < 2.5,
        "Clip duration {} not shorter than source",
        info.duration
    );
}

#[tokio::test]
async fn test_server_ephemeral_frame_leaves_no_artifacts() {
    skip_if_no_integration!();

    let fixture = Fixture::new(1.0);
    let server = VideoFramesServer::new(&Config::default());

    let before: std::collections::HashSet<_> = temp_entries();

    let result = server
        .extract_frame(ExtractFrameParams {
            video_path: fixture.video.clone(),
            output_path: None,
            timestamp: None,
            frame_index: None,
        })
        .await
        .expect("Ephemeral frame extraction failed");
    assert_eq!(result.content.len(), 2, "text plus inline image expected");

    let after: std::collections::HashSet<_> = temp_entries();
    let leaked: Vec<_> = after.difference(&before).collect();
    assert!(leaked.is_empty(), "temp artifacts left behind: {:?}", leaked);
}

/// Entries currently in the server's managed temp directory.
fn temp_entries() -> std::collections::HashSet<std::path::PathBuf> {
    let dir = std::env::temp_dir().join("video-frames-mcp");
    match std::fs::read_dir(&dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Default::default(),
    }
}
