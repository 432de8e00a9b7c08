use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use trackreel_core::TimeUs;

use crate::error::{RenderError, Result};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Run ffprobe on a media file and return its container duration.
pub fn probe_duration(path: impl AsRef<Path>) -> Result<TimeUs> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RenderError::FileNotFound(path.to_path_buf()));
    }

    let output = std::process::Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| RenderError::FfprobeExec(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RenderError::FfprobeFailed(stderr.into_owned()));
    }

    parse_duration(&output.stdout, path)
}

fn parse_duration(stdout: &[u8], path: &Path) -> Result<TimeUs> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;
    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .map(TimeUs::from_seconds)
        .ok_or_else(|| RenderError::NoDuration(path.to_path_buf()))
}

/// Run-scoped prober: every distinct file is probed at most once, since each
/// probe is an out-of-process call.
#[derive(Debug, Default)]
pub struct Prober {
    cache: HashMap<PathBuf, TimeUs>,
}

impl Prober {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(&mut self, path: &Path) -> Result<TimeUs> {
        if let Some(duration) = self.cache.get(path) {
            return Ok(*duration);
        }
        let duration = probe_duration(path)?;
        self.cache.insert(path.to_path_buf(), duration);
        Ok(duration)
    }
}
