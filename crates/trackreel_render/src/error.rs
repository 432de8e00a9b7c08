use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to execute ffprobe: {0}")]
    FfprobeExec(String),

    #[error("ffprobe failed: {0}")]
    FfprobeFailed(String),

    #[error("no duration reported for {0}")]
    NoDuration(PathBuf),

    #[error("ffmpeg not found")]
    FfmpegNotFound,

    #[error("ffmpeg failed: {0}")]
    FfmpegFailed(String),

    #[error("audio combine failed: {0}")]
    CombineFailed(String),

    #[error("video composition failed: {0}")]
    ComposeFailed(String),

    #[error("no background image or video found in {0}")]
    NoBackground(PathBuf),

    #[error("background directory is empty or unreadable: {0}")]
    EmptyBackgroundDir(PathBuf),

    #[error(transparent)]
    Core(#[from] trackreel_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Attribute a raw ffmpeg failure to the audio-combine stage.
    pub(crate) fn into_combine(self) -> Self {
        match self {
            RenderError::FfmpegFailed(msg) => RenderError::CombineFailed(msg),
            other => other,
        }
    }

    /// Attribute a raw ffmpeg failure to the video-composition stage.
    pub(crate) fn into_compose(self) -> Self {
        match self {
            RenderError::FfmpegFailed(msg) => RenderError::ComposeFailed(msg),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
