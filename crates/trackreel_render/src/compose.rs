use std::path::Path;
use trackreel_core::{BackgroundSource, ProjectPaths};

use crate::background::synthesize_loop;
use crate::error::Result;
use crate::ffmpeg::{self, fmt_seconds, FfmpegJob, Input};
use crate::probe::Prober;
use crate::temp::{staging_path, ScopedPath};

/// Fixed output frame size for broad player compatibility.
const FRAME_SIZE: &str = "1280x720";

/// Composite the resolved background with the combined audio into the final
/// video. The background repeats as needed; the audio stream terminates the
/// output (`-shortest`).
pub async fn compose(
    background: &BackgroundSource,
    paths: &ProjectPaths,
    prober: &mut Prober,
) -> Result<()> {
    let required = prober.duration(&paths.combined_audio)?;

    let background_input = match background {
        BackgroundSource::StaticImage(image) => {
            Input::file_with_options(image, &["-loop", "1", "-t", &fmt_seconds(required)])
        }
        BackgroundSource::SingleVideo(video) => {
            Input::file_with_options(video, &["-stream_loop", "-1"])
        }
        BackgroundSource::MultiVideoLoop(clips) => {
            synthesize_loop(
                clips,
                required,
                prober,
                &paths.concat_list,
                &paths.looped_background,
            )
            .await?;
            Input::file_with_options(&paths.looped_background, &["-stream_loop", "-1"])
        }
    };

    tracing::info!(
        duration_s = required.as_seconds(),
        "composing final video into {}",
        paths.output_video.display()
    );

    let staging = ScopedPath(staging_path(&paths.output_video));
    let job = compose_job(background_input, &paths.combined_audio, &staging.0);
    ffmpeg::run(&job).await.map_err(|e| e.into_compose())?;
    std::fs::rename(&staging.0, &paths.output_video)?;
    Ok(())
}

fn compose_job(background: Input, audio: &Path, output: &Path) -> FfmpegJob {
    FfmpegJob {
        inputs: vec![background, Input::file(audio)],
        filter_graph: None,
        output_args: [
            "-c:v", "libx264", "-c:a", "aac", "-b:a", "192k", "-shortest", "-pix_fmt", "yuv420p",
            "-s", FRAME_SIZE,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        output_path: output.to_path_buf(),
    }
}
