//! SceneLens Core Library
//!
//! Submits a video and an analyzer schema to a content analysis service and
//! turns the returned content blocks into field and transcript presentations.

pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod render;
pub mod selection;
pub mod service;
pub mod types;
pub mod workflow;

// Re-export commonly used items at crate root
pub use config::ServiceConfig;
pub use error::{Error, MissingFile, Result};
pub use format::{format_duration, format_size, format_time_range, format_timestamp_ms};
pub use render::{
    BlockView, MISSING_VALUE, PALETTE, PaletteColor, RenderedField, TranscriptSection,
    block_title, render_block, render_transcripts, transcript_text,
};
pub use selection::Selection;
pub use service::{
    AnalysisService, HttpAnalysisService, PendingFile, UploadRequest, VideoPreview,
};
pub use types::{AnalysisResult, ContentBlock, Field, FieldValue, Fields};
pub use workflow::{Layout, ResultSession, SubmissionState, Submission, Workflow};
