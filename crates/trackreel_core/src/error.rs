use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timeline requires at least one track")]
    EmptyTimeline,

    #[error("crossfade requires at least 2 tracks, got {0}")]
    InsufficientTracks(usize),

    #[error("no audio tracks found in {0}")]
    NoAudioTracks(PathBuf),

    #[error("missing input directory: {0}")]
    MissingDirectory(PathBuf),

    #[error("timeline export needs one title per start time ({titles} titles, {starts} start times)")]
    TitleCountMismatch { titles: usize, starts: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
