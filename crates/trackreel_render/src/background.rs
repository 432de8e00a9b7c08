use std::path::{Path, PathBuf};
use trackreel_core::{BackgroundSource, TimeUs};

use crate::error::{RenderError, Result};
use crate::ffmpeg::{self, FfmpegJob, Input};
use crate::probe::Prober;
use crate::temp::ScopedPath;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv"];

/// Ceiling on concat-list entries when repeating a clip cycle, bounding the
/// plan size for very long audio over very short clips.
const MAX_LOOP_ENTRIES: usize = 1000;

/// Pick the background visual source from the candidate files in a
/// directory. Deterministic for a given directory content: candidates are
/// sorted lexically, a lone video wins over images, several videos become a
/// loop cycle, images are the fallback.
pub fn resolve(background_dir: &Path) -> Result<BackgroundSource> {
    let entries = std::fs::read_dir(background_dir)
        .map_err(|_| RenderError::EmptyBackgroundDir(background_dir.to_path_buf()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));

    if files.is_empty() {
        return Err(RenderError::EmptyBackgroundDir(background_dir.to_path_buf()));
    }

    let mut videos: Vec<PathBuf> = files
        .iter()
        .filter(|f| has_extension(f, VIDEO_EXTENSIONS))
        .cloned()
        .collect();
    let image = files.iter().find(|f| has_extension(f, IMAGE_EXTENSIONS));

    if videos.len() == 1 {
        Ok(BackgroundSource::SingleVideo(videos.remove(0)))
    } else if videos.len() > 1 {
        Ok(BackgroundSource::MultiVideoLoop(videos))
    } else if let Some(image) = image {
        Ok(BackgroundSource::StaticImage(image.clone()))
    } else {
        Err(RenderError::NoBackground(background_dir.to_path_buf()))
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Stream-copy concat of the clip cycle, repeated until it covers at least
/// `required`. Writes the transient concat list next to the output and
/// removes it whatever happens.
pub async fn synthesize_loop(
    clips: &[PathBuf],
    required: TimeUs,
    prober: &mut Prober,
    list_path: &Path,
    output: &Path,
) -> Result<()> {
    let mut cycle = TimeUs::ZERO;
    for clip in clips {
        cycle = cycle + prober.duration(clip)?;
    }
    if cycle <= TimeUs::ZERO {
        return Err(RenderError::ComposeFailed(
            "background clips have zero total duration".to_string(),
        ));
    }

    let entries = repeated_entries(clips, cycle, required);
    tracing::info!(
        clips = clips.len(),
        entries = entries.len(),
        "synthesizing looped background into {}",
        output.display()
    );

    let list = ScopedPath(list_path.to_path_buf());
    std::fs::write(&list.0, concat_list(&entries))?;

    let job = FfmpegJob {
        inputs: vec![Input::file_with_options(list_path, &["-f", "concat", "-safe", "0"])],
        filter_graph: None,
        output_args: vec!["-c".to_string(), "copy".to_string()],
        output_path: output.to_path_buf(),
    };
    ffmpeg::run(&job).await.map_err(|e| e.into_compose())
}

/// The clip cycle repeated ⌈required / cycle⌉ times, truncated to the entry
/// ceiling.
fn repeated_entries(clips: &[PathBuf], cycle: TimeUs, required: TimeUs) -> Vec<PathBuf> {
    let repeats = ((required.0 + cycle.0 - 1) / cycle.0).max(1) as usize;
    clips
        .iter()
        .cycle()
        .take(clips.len() * repeats)
        .take(MAX_LOOP_ENTRIES)
        .cloned()
        .collect()
}

/// Concat-demuxer list: one `file '<path>'` line per entry, single quotes
/// escaped for the demuxer.
fn concat_list(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|path| {
            let escaped = path.to_string_lossy().replace('\'', "'\\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn single_video_wins_over_image() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "cover.jpg");
        touch(dir.path(), "clip.mp4");

        let source = resolve(dir.path()).unwrap();
        assert_eq!(
            source,
            BackgroundSource::SingleVideo(dir.path().join("clip.mp4"))
        );
    }

    #[test]
    fn multiple_videos_become_a_sorted_loop() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.mov");
        touch(dir.path(), "a.mp4");
        touch(dir.path(), "cover.png");

        let source = resolve(dir.path()).unwrap();
        assert_eq!(
            source,
            BackgroundSource::MultiVideoLoop(vec![
                dir.path().join("a.mp4"),
                dir.path().join("b.mov"),
            ])
        );
    }

    #[test]
    fn image_only_is_static() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "cover.JPG");

        let source = resolve(dir.path()).unwrap();
        assert_eq!(
            source,
            BackgroundSource::StaticImage(dir.path().join("cover.JPG"))
        );
    }

    #[test]
    fn no_candidates_among_files_fails() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.txt");

        let result = resolve(dir.path());
        assert!(matches!(result, Err(RenderError::NoBackground(_))));
    }

    #[test]
    fn empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = resolve(dir.path());
        assert!(matches!(result, Err(RenderError::EmptyBackgroundDir(_))));
    }

    #[test]
    fn unreadable_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = resolve(&dir.path().join("absent"));
        assert!(matches!(result, Err(RenderError::EmptyBackgroundDir(_))));
    }

    #[test]
    fn repeated_entries_cover_required_duration() {
        let clips = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        // 10s cycle, 25s of audio: 3 repetitions of the cycle.
        let entries = repeated_entries(
            &clips,
            TimeUs::from_seconds(10.0),
            TimeUs::from_seconds(25.0),
        );
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0], PathBuf::from("a.mp4"));
        assert_eq!(entries[5], PathBuf::from("b.mp4"));
    }

    #[test]
    fn repeated_entries_exact_multiple_does_not_over_repeat() {
        let clips = vec![PathBuf::from("a.mp4")];
        let entries = repeated_entries(
            &clips,
            TimeUs::from_seconds(10.0),
            TimeUs::from_seconds(20.0),
        );
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn repeated_entries_capped() {
        let clips = vec![PathBuf::from("a.mp4")];
        // 1s clip against 10h of audio would need 36000 entries.
        let entries = repeated_entries(
            &clips,
            TimeUs::from_seconds(1.0),
            TimeUs::from_seconds(36_000.0),
        );
        assert_eq!(entries.len(), MAX_LOOP_ENTRIES);
    }

    #[test]
    fn concat_list_escapes_single_quotes() {
        let entries = vec![PathBuf::from("/clips/it's here.mp4")];
        assert_eq!(
            concat_list(&entries),
            "file '/clips/it'\\''s here.mp4'\n"
        );
    }

    #[test]
    fn concat_list_one_line_per_entry() {
        let entries = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        assert_eq!(concat_list(&entries), "file 'a.mp4'\nfile 'b.mp4'\n");
    }
}
