use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};

/// Audio formats eligible for combination.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a"];

/// Find the eligible audio files in a directory, sorted lexically by file
/// name. The sort order fixes the track order for the whole run.
pub fn discover(audio_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(audio_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .collect();

    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));

    if files.is_empty() {
        return Err(CoreError::NoAudioTracks(audio_dir.to_path_buf()));
    }
    Ok(files)
}

/// Filename-derived fallback title: the file stem.
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Where the resolved titles came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleSource {
    /// Taken from the custom names file.
    Custom,
    /// No names file present; filename-derived defaults.
    Defaults,
    /// A names file exists but holds fewer non-empty lines than there are
    /// tracks; defaults were used instead. Informational, never fatal.
    FallbackShortList { available: usize, needed: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Titles {
    pub names: Vec<String>,
    pub source: TitleSource,
}

/// Resolve one title per track. Custom names are used only when the names
/// file has at least as many non-empty lines as there are tracks (the first
/// N are taken); a shorter list falls back to defaults.
pub fn resolve_titles(names_file: &Path, files: &[PathBuf]) -> Result<Titles> {
    let defaults = || files.iter().map(|f| default_title(f)).collect();

    if !names_file.exists() {
        return Ok(Titles {
            names: defaults(),
            source: TitleSource::Defaults,
        });
    }

    let content = std::fs::read_to_string(names_file)?;
    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if lines.len() >= files.len() {
        Ok(Titles {
            names: lines.into_iter().take(files.len()).collect(),
            source: TitleSource::Custom,
        })
    } else {
        Ok(Titles {
            names: defaults(),
            source: TitleSource::FallbackShortList {
                available: lines.len(),
                needed: files.len(),
            },
        })
    }
}
