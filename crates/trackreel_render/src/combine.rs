use std::path::Path;
use trackreel_core::{timeline, ProjectPaths, Strategy, TimeUs, Track};

use crate::error::Result;
use crate::ffmpeg::{self, fmt_seconds, FfmpegJob, Input};
use crate::temp::{staging_path, ScopedPath, TempSet};

/// Silence segment source for the pause strategy; sample rate and channel
/// layout match the mp3 output.
const SILENCE_SPEC: &str = "anullsrc=r=44100:cl=stereo";

/// Per-track durations and start times of the combined output. Start times
/// come from the timeline plan, never re-derived here.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedAudio {
    pub durations: Vec<TimeUs>,
    pub start_times: Vec<TimeUs>,
}

/// Merge the tracks into one audio file at `paths.combined_audio` according
/// to the strategy. The destination only ever holds a finished artifact:
/// every strategy writes to a scratch location first and renames into place,
/// and scratch files are removed on success and failure alike.
pub async fn combine(
    tracks: &[Track],
    strategy: &Strategy,
    paths: &ProjectPaths,
) -> Result<CombinedAudio> {
    let durations: Vec<TimeUs> = tracks.iter().map(|t| t.duration).collect();
    let plan = timeline::plan(&durations, strategy)?;

    tracing::info!(
        tracks = tracks.len(),
        ?strategy,
        "combining audio into {}",
        paths.combined_audio.display()
    );

    match strategy {
        Strategy::Pause { gap } => {
            materialize(pause_job(tracks, *gap, &paths.combined_audio), &paths.combined_audio)
                .await?
        }
        Strategy::LinearFade { fade } => {
            materialize(fade_job(tracks, *fade, &paths.combined_audio), &paths.combined_audio)
                .await?
        }
        Strategy::Crossfade { fade } => {
            crossfade(tracks, *fade, &paths.combined_audio, &paths.output_dir).await?
        }
    }

    Ok(CombinedAudio {
        durations,
        start_times: plan.start_times,
    })
}

/// Run a single-invocation job against a staging path, then move the result
/// over the destination.
async fn materialize(job: FfmpegJob, output: &Path) -> Result<()> {
    let staging = ScopedPath(job.output_path.clone());
    ffmpeg::run(&job).await.map_err(|e| e.into_combine())?;
    std::fs::rename(&staging.0, output)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pause
// ---------------------------------------------------------------------------

/// N tracks interleaved with N-1 synthesized silences, concatenated in one
/// filter. A zero gap degenerates to a plain concat of the tracks.
fn pause_job(tracks: &[Track], gap: TimeUs, output: &Path) -> FfmpegJob {
    let mut inputs = Vec::new();
    for (i, track) in tracks.iter().enumerate() {
        inputs.push(Input::file(&track.path));
        if gap > TimeUs::ZERO && i + 1 != tracks.len() {
            inputs.push(Input::lavfi(SILENCE_SPEC, gap));
        }
    }

    let labels: String = (0..inputs.len()).map(|i| format!("[{i}:a]")).collect();
    let graph = format!("{labels}concat=n={}:v=0:a=1[outa]", inputs.len());

    FfmpegJob {
        inputs,
        filter_graph: Some(graph),
        output_args: audio_output_args(),
        output_path: staging_path(output),
    }
}

// ---------------------------------------------------------------------------
// LinearFade
// ---------------------------------------------------------------------------

/// Fade-in at the start of every non-first track; fade-out ending at the end
/// of every non-last track whose duration exceeds the fade window (shorter
/// tracks skip the fade-out). Tracks stay back-to-back.
fn fade_job(tracks: &[Track], fade: TimeUs, output: &Path) -> FfmpegJob {
    let fade_s = fmt_seconds(fade);
    let mut parts = Vec::new();
    let mut fade_labels = String::new();

    for (i, track) in tracks.iter().enumerate() {
        let mut filters = Vec::new();
        if i != 0 {
            filters.push(format!("afade=t=in:st=0:d={fade_s}"));
        }
        if i + 1 != tracks.len() && track.duration > fade {
            let fade_out_start = (track.duration - fade).as_seconds().max(0.0);
            filters.push(format!("afade=t=out:st={fade_out_start:.3}:d={fade_s}"));
        }
        if filters.is_empty() {
            filters.push("anull".to_string());
        }
        parts.push(format!("[{i}:a]{}[a{i}]", filters.join(",")));
        fade_labels.push_str(&format!("[a{i}]"));
    }

    parts.push(format!(
        "{fade_labels}concat=n={}:v=0:a=1[outa]",
        tracks.len()
    ));

    FfmpegJob {
        inputs: tracks.iter().map(|t| Input::file(&t.path)).collect(),
        filter_graph: Some(parts.join(";")),
        output_args: audio_output_args(),
        output_path: staging_path(output),
    }
}

// ---------------------------------------------------------------------------
// Crossfade
// ---------------------------------------------------------------------------

/// Pairwise reduction: merge the first two tracks, then repeatedly merge the
/// running intermediate with the next track. Intermediates live in
/// `work_dir` and are removed on every exit path; the last one becomes the
/// output via rename.
async fn crossfade(tracks: &[Track], fade: TimeUs, output: &Path, work_dir: &Path) -> Result<()> {
    let mut temps = TempSet::new(work_dir);

    let mut previous = temps.next();
    ffmpeg::run(&crossfade_job(&tracks[0].path, &tracks[1].path, fade, &previous))
        .await
        .map_err(|e| e.into_combine())?;

    for track in &tracks[2..] {
        let next = temps.next();
        ffmpeg::run(&crossfade_job(&previous, &track.path, fade, &next))
            .await
            .map_err(|e| e.into_combine())?;
        previous = next;
    }

    std::fs::rename(&previous, output)?;
    Ok(())
}

fn crossfade_job(first: &Path, second: &Path, fade: TimeUs, output: &Path) -> FfmpegJob {
    let fade_s = fmt_seconds(fade);
    FfmpegJob {
        inputs: vec![Input::file(first), Input::file(second)],
        filter_graph: Some(format!(
            "[0:a][1:a]acrossfade=d={fade_s}:c1=tri:c2=tri[outa]"
        )),
        output_args: audio_output_args(),
        output_path: output.to_path_buf(),
    }
}

fn audio_output_args() -> Vec<String> {
    ["-map", "[outa]", "-c:a", "libmp3lame", "-q:a", "0"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use trackreel_core::CoreError;

    fn track(name: &str, seconds: f64) -> Track {
        Track {
            path: PathBuf::from(format!("/audio/{name}")),
            duration: TimeUs::from_seconds(seconds),
            title: name.to_string(),
        }
    }

    #[test]
    fn pause_job_interleaves_silences() {
        let tracks = vec![track("a.mp3", 10.0), track("b.mp3", 8.0), track("c.mp3", 6.0)];
        let job = pause_job(&tracks, TimeUs::from_seconds(2.0), Path::new("/out/combined.mp3"));

        // 3 tracks + 2 silences.
        assert_eq!(job.inputs.len(), 5);
        assert_eq!(job.inputs[1].source, SILENCE_SPEC);
        assert_eq!(job.inputs[1].options, ["-f", "lavfi", "-t", "2"]);
        assert_eq!(job.inputs[4].source, "/audio/c.mp3");
        assert_eq!(
            job.filter_graph.as_deref(),
            Some("[0:a][1:a][2:a][3:a][4:a]concat=n=5:v=0:a=1[outa]")
        );
        assert_eq!(job.output_path, PathBuf::from("/out/combined.mp3.part"));
    }

    #[test]
    fn pause_job_with_zero_gap_has_no_silences() {
        let tracks = vec![track("a.mp3", 10.0), track("b.mp3", 8.0)];
        let job = pause_job(&tracks, TimeUs::ZERO, Path::new("/out/combined.mp3"));
        assert_eq!(job.inputs.len(), 2);
        assert_eq!(
            job.filter_graph.as_deref(),
            Some("[0:a][1:a]concat=n=2:v=0:a=1[outa]")
        );
    }

    #[test]
    fn pause_job_never_appends_trailing_silence() {
        let tracks = vec![track("only.mp3", 30.0)];
        let job = pause_job(&tracks, TimeUs::from_seconds(5.0), Path::new("/out/c.mp3"));
        assert_eq!(job.inputs.len(), 1);
    }

    #[test]
    fn fade_job_shapes_inner_tracks_both_ways() {
        let tracks = vec![track("a.mp3", 10.0), track("b.mp3", 8.0), track("c.mp3", 6.0)];
        let job = fade_job(&tracks, TimeUs::from_seconds(3.0), Path::new("/out/combined.mp3"));
        let graph = job.filter_graph.unwrap();

        // First track: fade-out only, starting 3s before its end.
        assert!(graph.contains("[0:a]afade=t=out:st=7.000:d=3[a0]"));
        // Middle track: fade-in then fade-out.
        assert!(graph.contains("[1:a]afade=t=in:st=0:d=3,afade=t=out:st=5.000:d=3[a1]"));
        // Last track: fade-in only.
        assert!(graph.contains("[2:a]afade=t=in:st=0:d=3[a2]"));
        assert!(graph.ends_with("[a0][a1][a2]concat=n=3:v=0:a=1[outa]"));
    }

    #[test]
    fn fade_job_skips_fade_out_for_short_tracks() {
        // 2s track with a 3s fade window: fade-out is skipped, not an error.
        let tracks = vec![track("short.mp3", 2.0), track("b.mp3", 8.0)];
        let job = fade_job(&tracks, TimeUs::from_seconds(3.0), Path::new("/out/combined.mp3"));
        let graph = job.filter_graph.unwrap();
        assert!(graph.contains("[0:a]anull[a0]"));
        assert!(!graph.contains("st=-"));
    }

    #[test]
    fn fade_job_equal_duration_and_fade_skips_fade_out() {
        let tracks = vec![track("edge.mp3", 3.0), track("b.mp3", 8.0)];
        let job = fade_job(&tracks, TimeUs::from_seconds(3.0), Path::new("/out/combined.mp3"));
        assert!(job.filter_graph.unwrap().contains("[0:a]anull[a0]"));
    }

    #[test]
    fn crossfade_job_uses_triangular_curves() {
        let job = crossfade_job(
            Path::new("/audio/a.mp3"),
            Path::new("/audio/b.mp3"),
            TimeUs::from_seconds(2.5),
            Path::new("/out/.tmp-crossfade-0.mp3"),
        );
        assert_eq!(
            job.filter_graph.as_deref(),
            Some("[0:a][1:a]acrossfade=d=2.5:c1=tri:c2=tri[outa]")
        );
        assert_eq!(job.output_args[..2], ["-map", "[outa]"]);
    }

    #[tokio::test]
    async fn combine_single_track_crossfade_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::resolve(dir.path());
        paths.ensure_output_dir().unwrap();

        let tracks = vec![track("only.mp3", 10.0)];
        let strategy = Strategy::Crossfade { fade: TimeUs::from_seconds(2.0) };
        let result = combine(&tracks, &strategy, &paths).await;

        assert!(matches!(
            result,
            Err(crate::RenderError::Core(CoreError::InsufficientTracks(1)))
        ));
        assert!(!paths.combined_audio.exists());
    }

    #[tokio::test]
    async fn failed_crossfade_cleans_temps_and_destination() {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::resolve(dir.path());
        paths.ensure_output_dir().unwrap();

        // Nonexistent inputs: ffmpeg fails (or is absent); either way the
        // combine errors out.
        let tracks = vec![
            track("missing-a.mp3", 10.0),
            track("missing-b.mp3", 8.0),
            track("missing-c.mp3", 6.0),
        ];
        let strategy = Strategy::Crossfade { fade: TimeUs::from_seconds(2.0) };
        let result = combine(&tracks, &strategy, &paths).await;
        assert!(result.is_err());

        assert!(!paths.combined_audio.exists());
        let leftovers: Vec<_> = std::fs::read_dir(&paths.output_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-crossfade-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn failed_pause_combine_leaves_no_partial_destination() {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::resolve(dir.path());
        paths.ensure_output_dir().unwrap();

        let tracks = vec![track("missing-a.mp3", 10.0), track("missing-b.mp3", 8.0)];
        let strategy = Strategy::Pause { gap: TimeUs::from_seconds(1.0) };
        let result = combine(&tracks, &strategy, &paths).await;
        assert!(result.is_err());

        assert!(!paths.combined_audio.exists());
        assert!(!staging_path(&paths.combined_audio).exists());
    }
}
