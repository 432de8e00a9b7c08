use crate::error::{RenderError, Result};
use std::path::{Path, PathBuf};
use trackreel_core::TimeUs;

/// One input to an ffmpeg invocation: per-input options, then `-i <source>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub options: Vec<String>,
    pub source: String,
}

impl Input {
    pub fn file(path: &Path) -> Self {
        Self {
            options: vec![],
            source: path.to_string_lossy().into_owned(),
        }
    }

    pub fn file_with_options(path: &Path, options: &[&str]) -> Self {
        Self {
            options: options.iter().map(|s| s.to_string()).collect(),
            source: path.to_string_lossy().into_owned(),
        }
    }

    /// A synthesized lavfi source bounded to `duration`.
    pub fn lavfi(spec: &str, duration: TimeUs) -> Self {
        Self {
            options: vec![
                "-f".to_string(),
                "lavfi".to_string(),
                "-t".to_string(),
                fmt_seconds(duration),
            ],
            source: spec.to_string(),
        }
    }
}

/// A single ffmpeg invocation: N inputs, an optional filter graph, explicit
/// output mapping/codec args, and one output path.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegJob {
    pub inputs: Vec<Input>,
    pub filter_graph: Option<String>,
    pub output_args: Vec<String>,
    pub output_path: PathBuf,
}

impl FfmpegJob {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }
        if let Some(graph) = &self.filter_graph {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }
        args.extend(self.output_args.iter().cloned());
        args.push(self.output_path.to_string_lossy().into_owned());
        args
    }
}

/// Invoke ffmpeg and wait for it to finish. A non-zero exit surfaces the tail
/// of stderr; a missing binary is reported distinctly.
pub async fn run(job: &FfmpegJob) -> Result<()> {
    let args = job.args();
    tracing::debug!(?args, "invoking ffmpeg");

    let output = tokio::process::Command::new("ffmpeg")
        .args(&args)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::FfmpegNotFound
            } else {
                RenderError::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RenderError::FfmpegFailed(stderr_excerpt(&stderr)));
    }
    Ok(())
}

/// Render a time value the way ffmpeg option values expect seconds.
pub(crate) fn fmt_seconds(t: TimeUs) -> String {
    format!("{}", t.as_seconds())
}

/// Last few stderr lines; enough to carry the actual error without dumping
/// the whole encode log into the message.
fn stderr_excerpt(stderr: &str) -> String {
    const KEEP: usize = 8;
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(KEEP);
    lines[start..].join("\n")
}
