use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};

/// The fixed on-disk layout of a project, resolved once per run and passed
/// explicitly to every component that touches a path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub input_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub background_dir: PathBuf,
    pub output_dir: PathBuf,
    pub combined_audio: PathBuf,
    pub output_video: PathBuf,
    pub timeline_file: PathBuf,
    pub names_file: PathBuf,
    /// Transient concat list consumed by the looped-background synthesis.
    pub concat_list: PathBuf,
    pub looped_background: PathBuf,
}

impl ProjectPaths {
    pub fn resolve(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let input_dir = root.join("in");
        let audio_dir = input_dir.join("audio");
        let background_dir = input_dir.join("background");
        let output_dir = root.join("out");
        Self {
            combined_audio: output_dir.join("combined.mp3"),
            output_video: output_dir.join("final_video.mp4"),
            timeline_file: output_dir.join("timeline.txt"),
            names_file: audio_dir.join("track-names.txt"),
            concat_list: output_dir.join("video_input.txt"),
            looped_background: output_dir.join("looped_background.mp4"),
            root,
            input_dir,
            audio_dir,
            background_dir,
            output_dir,
        }
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Create the full project layout, including an empty track-names file.
    /// Used by the scaffolding entry point.
    pub fn scaffold(&self) -> Result<()> {
        std::fs::create_dir_all(&self.audio_dir)?;
        std::fs::create_dir_all(&self.background_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::write(&self.names_file, "")?;
        Ok(())
    }
}

/// Fail with a descriptive error when a required input directory is absent.
pub fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CoreError::MissingDirectory(dir.to_path_buf()))
    }
}
