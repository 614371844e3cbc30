//! MCP server façade for the video-frames tools.
//!
//! Registers each command builder as a named, schema-typed tool and adapts
//! results into response envelopes of text and inline base64 image payloads.
//! When a caller omits an output location, a uniquely-named temporary
//! file/directory is synthesized, the bytes are read back into the response,
//! and the artifact is deleted on every exit path.

use crate::config::Config;
use crate::error::Error;
use crate::handler::{
    ExtractClipParams, ExtractFrameParams, ExtractMultipleFramesParams, GetVideoInfoParams,
    VideoHandler,
};
use crate::ocr::{CommandOcr, OcrEngine};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolResult, Content, ListResourcesResult, ReadResourceResult, ServerCapabilities,
        ServerInfo,
    },
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// MCP server exposing frame, clip, and metadata tools.
#[derive(Clone)]
pub struct VideoFramesServer {
    /// Handler for ffmpeg operations
    handler: Arc<VideoHandler>,
    /// Optional OCR collaborator; absent when not configured
    ocr: Option<Arc<dyn OcrEngine>>,
    /// Directory for synthesized temporary outputs
    temp_dir: PathBuf,
}

impl VideoFramesServer {
    /// Create a new server with the given configuration.
    pub fn new(config: &Config) -> Self {
        let ocr = config
            .ocr_command
            .as_deref()
            .and_then(|line| CommandOcr::from_command_line(line, config.process_timeout()))
            .map(|engine| Arc::new(engine) as Arc<dyn OcrEngine>);

        Self {
            handler: Arc::new(VideoHandler::new(config)),
            ocr,
            temp_dir: std::env::temp_dir().join("video-frames-mcp"),
        }
    }

    /// Create a server with provided dependencies (for testing).
    #[cfg(test)]
    pub fn with_deps(
        handler: VideoHandler,
        ocr: Option<Arc<dyn OcrEngine>>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            ocr,
            temp_dir,
        }
    }

    // =========================================================================
    // Tool Implementations
    // =========================================================================

    /// Extract a single frame, returning text plus an inline image payload.
    pub async fn extract_frame(
        &self,
        params: ExtractFrameParams,
    ) -> Result<CallToolResult, McpError> {
        info!(video = %params.video_path, "Extracting frame");

        let (output_path, ephemeral) = match &params.output_path {
            Some(path) => (PathBuf::from(path), false),
            None => (
                self.temp_path(&format!("{}.jpg", Uuid::new_v4()))
                    .await
                    .map_err(to_mcp_error)?,
                true,
            ),
        };

        let result = self.frame_response(&params, &output_path).await;

        if ephemeral {
            let _ = tokio::fs::remove_file(&output_path).await;
        }

        result.map_err(to_mcp_error)
    }

    async fn frame_response(
        &self,
        params: &ExtractFrameParams,
        output_path: &Path,
    ) -> Result<CallToolResult, Error> {
        let path = self.handler.extract_frame(params, output_path).await?;
        let bytes = tokio::fs::read(&path).await?;

        let mut text = format!("Frame extracted successfully: {}", path.display());
        if let Some(recognized) = self.recognize_text(&bytes).await {
            text.push_str("\nRecognized text:\n");
            text.push_str(&recognized);
        }

        Ok(CallToolResult::success(vec![
            Content::text(text),
            Content::image(BASE64.encode(&bytes), mime_type_for(&path)),
        ]))
    }

    /// Extract multiple frames, returning text plus one image payload per frame.
    pub async fn extract_multiple_frames(
        &self,
        params: ExtractMultipleFramesParams,
    ) -> Result<CallToolResult, McpError> {
        info!(video = %params.video_path, "Extracting multiple frames");

        let (output_dir, ephemeral) = match &params.output_dir {
            Some(dir) => (PathBuf::from(dir), false),
            None => (
                self.temp_path(&format!("frames-{}", Uuid::new_v4()))
                    .await
                    .map_err(to_mcp_error)?,
                true,
            ),
        };

        let result = self.frames_response(&params, &output_dir).await;

        if ephemeral {
            let _ = tokio::fs::remove_dir_all(&output_dir).await;
        }

        result.map_err(to_mcp_error)
    }

    async fn frames_response(
        &self,
        params: &ExtractMultipleFramesParams,
        output_dir: &Path,
    ) -> Result<CallToolResult, Error> {
        let frames = self
            .handler
            .extract_multiple_frames(params, output_dir)
            .await?;

        let listing: Vec<String> = frames.iter().map(|p| p.display().to_string()).collect();
        let mut content = vec![Content::text(format!(
            "Extracted {} frames:\n{}",
            frames.len(),
            listing.join("\n")
        ))];

        for frame in &frames {
            let bytes = tokio::fs::read(frame).await?;
            content.push(Content::image(BASE64.encode(&bytes), mime_type_for(frame)));
        }

        Ok(CallToolResult::success(content))
    }

    /// Probe video metadata, returning it as pretty-printed JSON text.
    pub async fn get_video_info(
        &self,
        params: GetVideoInfoParams,
    ) -> Result<CallToolResult, McpError> {
        info!(video = %params.video_path, "Getting video info");

        let info = self
            .handler
            .get_video_info(&params)
            .await
            .map_err(to_mcp_error)?;

        let json = serde_json::to_string_pretty(&info).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize result: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Extract a clip, returning a textual confirmation.
    pub async fn extract_clip(
        &self,
        params: ExtractClipParams,
    ) -> Result<CallToolResult, McpError> {
        info!(video = %params.video_path, output = %params.output_path, "Extracting clip");

        let output = self
            .handler
            .extract_clip(&params)
            .await
            .map_err(to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Clip extracted successfully: {}",
            output.display()
        ))]))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Synthesize a uniquely-named path under the managed temp directory.
    async fn temp_path(&self, name: &str) -> Result<PathBuf, Error> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        Ok(self.temp_dir.join(name))
    }

    /// Run OCR if configured. Failures are logged and swallowed.
    async fn recognize_text(&self, image: &[u8]) -> Option<String> {
        let ocr = self.ocr.as_ref()?;
        match ocr.recognize(image).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "OCR failed, continuing without recognized text");
                None
            }
        }
    }
}

impl ServerHandler for VideoFramesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Video frame and clip extraction server using FFmpeg. \
                 Provides tools to extract frames and clips from video files \
                 and to probe video metadata."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            use rmcp::model::ListToolsResult;

            let tools = vec![
                create_tool::<ExtractFrameParams>(
                    "extract_frame",
                    "Extract a single frame from a video at a specific timestamp or frame index. \
                     Returns the extracted image inline; omit outputPath for an ephemeral result.",
                ),
                create_tool::<ExtractMultipleFramesParams>(
                    "extract_multiple_frames",
                    "Extract multiple frames from a video at regular intervals. \
                     Useful for creating thumbnails or analyzing video content.",
                ),
                create_tool::<GetVideoInfoParams>(
                    "get_video_info",
                    "Get detailed information about a video file including duration, \
                     resolution, fps, codec, and frame count.",
                ),
                create_tool::<ExtractClipParams>(
                    "extract_clip",
                    "Extract a short clip/segment from a video between two timestamps. \
                     Uses stream copy, so cuts snap to the nearest preceding keyframe.",
                ),
            ];

            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                "extract_frame" => {
                    let tool_params: ExtractFrameParams = parse_params(params.arguments)?;
                    self.extract_frame(tool_params).await
                }
                "extract_multiple_frames" => {
                    let tool_params: ExtractMultipleFramesParams = parse_params(params.arguments)?;
                    self.extract_multiple_frames(tool_params).await
                }
                "get_video_info" => {
                    let tool_params: GetVideoInfoParams = parse_params(params.arguments)?;
                    self.get_video_info(tool_params).await
                }
                "extract_clip" => {
                    let tool_params: ExtractClipParams = parse_params(params.arguments)?;
                    self.extract_clip(tool_params).await
                }
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", params.name),
                    None,
                )),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            // This server doesn't expose any resources
            Ok(ListResourcesResult {
                resources: vec![],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            Err(McpError::resource_not_found(
                format!("Unknown resource: {}", params.uri),
                None,
            ))
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// MIME type for an image file, derived from its extension. Everything not
/// recognized explicitly defaults to JPEG.
fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Map a handler error onto the MCP error surface. Validation failures are
/// the caller's to fix; everything else is an internal failure.
fn to_mcp_error(err: Error) -> McpError {
    match &err {
        Error::Validation(_) => McpError::invalid_params(err.to_string(), None),
        _ => McpError::internal_error(err.to_string(), None),
    }
}

/// Create a tool definition from a parameter type.
fn create_tool<T: JsonSchema>(name: &'static str, description: &'static str) -> rmcp::model::Tool {
    use schemars::schema_for;

    let schema = schema_for!(T);
    let schema_value = serde_json::to_value(&schema).unwrap_or_default();

    let input_schema = match schema_value {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    };

    rmcp::model::Tool {
        name: Cow::Borrowed(name),
        description: Some(Cow::Borrowed(description)),
        input_schema,
        annotations: None,
        icons: None,
        meta: None,
        output_schema: None,
        title: None,
    }
}

/// Parse tool parameters from JSON arguments.
fn parse_params<T: for<'de> Deserialize<'de>>(
    arguments: Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<T, McpError> {
    arguments
        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
        .transpose()
        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))?
        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))
}

// =============================================================================
// Tests
// =============================================================================
