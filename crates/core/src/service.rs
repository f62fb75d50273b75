//! Client side of the analysis service contract: one multipart POST carrying
//! the video under `file` and the schema under `schema`, answered by a JSON
//! body whose `result` object is the [`AnalysisResult`].

use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::{
    Body, Url,
    multipart::{Form, Part},
};
use tracing::debug;

use crate::{
    config::ServiceConfig,
    error::{Error, Result},
    format::format_size,
    types::AnalysisResult,
};

pub const VIDEO_PART: &str = "file";
pub const SCHEMA_PART: &str = "schema";
pub const SCHEMA_MIME: &str = "application/json";

/// Extensions offered by the video picker.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "mkv", "mov", "avi"];

/// A file chosen by the user and not yet uploaded. Contents are not inspected
/// until the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    path: PathBuf,
}

impl PendingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

/// What the upload form shows about the chosen video before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPreview {
    pub file_name: String,
    /// `None` when the file cannot be stat'ed (moved, unreadable).
    pub size_bytes: Option<u64>,
    pub mime: &'static str,
}

impl VideoPreview {
    pub fn of(file: &PendingFile) -> Self {
        let size_bytes = std::fs::metadata(file.path())
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len());

        Self {
            file_name: file.file_name(),
            size_bytes,
            mime: video_mime(file.path()),
        }
    }
}

impl fmt::Display for VideoPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self
            .size_bytes
            .map(format_size)
            .unwrap_or_else(|| "size unknown".to_string());
        write!(f, "{} · {} · {}", self.file_name, size, self.mime)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub video: PendingFile,
    pub schema: PendingFile,
}

pub trait AnalysisService {
    /// Perform one analysis. Called exactly once per submission; there is no
    /// retry and no client-side deadline.
    fn analyze(&self, request: UploadRequest)
    -> impl Future<Output = Result<AnalysisResult>> + Send;
}

/// Analysis service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpAnalysisService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, request: UploadRequest) -> Result<AnalysisResult> {
        let video_mime = video_mime(request.video.path());
        let form = Form::new()
            .part(VIDEO_PART, file_part(&request.video, video_mime).await?)
            .part(SCHEMA_PART, file_part(&request.schema, SCHEMA_MIME).await?);

        debug!(
            endpoint = %self.endpoint,
            video = %request.video.path().display(),
            schema = %request.schema.path().display(),
            "posting analysis request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "analysis response received");

        parse_response(status, &body)
    }
}

async fn file_part(file: &PendingFile, mime: &str) -> Result<Part> {
    let io_err = |source| Error::Io {
        path: file.path().to_path_buf(),
        source,
    };
    let handle = tokio::fs::File::open(file.path()).await.map_err(io_err)?;
    let len = handle.metadata().await.map_err(io_err)?.len();

    let part = Part::stream_with_length(Body::from(handle), len)
        .file_name(file.file_name())
        .mime_str(mime)?;
    Ok(part)
}

/// MIME type sent with the video part, guessed from the extension.
pub fn video_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// Interpret a service response. Non-success statuses become
/// [`Error::Service`], carrying the body's `error` message when there is one;
/// a success body without a usable `result` is [`Error::MalformedResult`].
pub fn parse_response(status: u16, body: &str) -> Result<AnalysisResult> {
    let json = serde_json::from_str::<serde_json::Value>(body);

    if !(200..300).contains(&status) {
        let message = json
            .ok()
            .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
            .unwrap_or_else(|| "no response body".to_string());
        return Err(Error::Service { status, message });
    }

    let value = json.map_err(|e| Error::MalformedResult {
        reason: format!("response is not JSON: {e}"),
    })?;

    let result = value
        .get("result")
        .filter(|result| !result.is_null())
        .ok_or_else(|| Error::MalformedResult {
            reason: "response has no `result` object".to_string(),
        })?;

    serde_json::from_value(result.clone()).map_err(|e| Error::MalformedResult {
        reason: e.to_string(),
    })
}
