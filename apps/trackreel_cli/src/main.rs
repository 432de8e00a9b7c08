use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use trackreel_core::tracks::TitleSource;
use trackreel_core::{export, paths, tracks, ProjectPaths, Strategy, TimeUs, Track};
use trackreel_render::probe::Prober;
use trackreel_render::{background, combine, compose};

#[derive(Parser, Debug)]
#[command(
    name = "trackreel",
    version,
    about = "Combine a folder of audio tracks into one timed stream, then render it over a looping background"
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Project folder (contains in/audio and in/background).
    project: Option<PathBuf>,

    /// Stop after the combined audio and timeline; skip video composition.
    #[arg(long, conflicts_with = "video")]
    audio: bool,

    /// Produce the final video (the default).
    #[arg(long)]
    video: bool,

    /// How consecutive tracks are joined.
    #[arg(long, value_enum, default_value_t = StrategyArg::Pause)]
    strategy: StrategyArg,

    /// Silence between tracks in seconds (pause strategy).
    #[arg(long, default_value_t = 2.0)]
    gap: f64,

    /// Fade window in seconds (fade and crossfade strategies).
    #[arg(long, default_value_t = 3.0)]
    fade: f64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scaffold a project folder under ./projects.
    New {
        /// Folder name; defaults to a timestamp.
        name: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Pause,
    Fade,
    Crossfade,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.cmd {
        Some(Command::New { name }) => cmd_new(name.clone()),
        None => {
            let Some(project) = cli.project.clone() else {
                bail!("missing project path (usage: trackreel <project> [--audio|--video])");
            };
            run_project(&cli, &project).await
        }
    }
}

fn resolve_strategy(cli: &Cli) -> anyhow::Result<Strategy> {
    match cli.strategy {
        StrategyArg::Pause => {
            if cli.gap < 0.0 {
                bail!("--gap must be >= 0, got {}", cli.gap);
            }
            Ok(Strategy::Pause { gap: TimeUs::from_seconds(cli.gap) })
        }
        StrategyArg::Fade => {
            if cli.fade < 0.0 {
                bail!("--fade must be >= 0, got {}", cli.fade);
            }
            Ok(Strategy::LinearFade { fade: TimeUs::from_seconds(cli.fade) })
        }
        StrategyArg::Crossfade => {
            if cli.fade <= 0.0 {
                bail!("--fade must be > 0 for crossfade, got {}", cli.fade);
            }
            Ok(Strategy::Crossfade { fade: TimeUs::from_seconds(cli.fade) })
        }
    }
}

async fn run_project(cli: &Cli, project: &Path) -> anyhow::Result<()> {
    let strategy = resolve_strategy(cli)?;
    let video_mode = !cli.audio;

    let project_paths = ProjectPaths::resolve(project);
    paths::require_dir(&project_paths.audio_dir)?;
    if video_mode {
        paths::require_dir(&project_paths.background_dir)?;
    }
    project_paths.ensure_output_dir()?;

    let files = tracks::discover(&project_paths.audio_dir)?;
    let titles = tracks::resolve_titles(&project_paths.names_file, &files)?;
    if let TitleSource::FallbackShortList { available, needed } = titles.source {
        tracing::warn!(
            available,
            needed,
            "track-names.txt has fewer names than tracks; using filename-derived titles"
        );
    }

    tracing::info!("gathering durations for {} tracks", files.len());
    let mut prober = Prober::new();
    let mut track_list = Vec::with_capacity(files.len());
    for (file, title) in files.iter().zip(titles.names) {
        let duration = prober
            .duration(file)
            .with_context(|| format!("probing {}", file.display()))?;
        tracing::info!("  {}: {:.3}s", title, duration.as_seconds());
        track_list.push(Track {
            path: file.clone(),
            duration,
            title,
        });
    }

    let combined = combine::combine(&track_list, &strategy, &project_paths).await?;

    let title_list: Vec<String> = track_list.iter().map(|t| t.title.clone()).collect();
    export::write_timeline(
        &project_paths.timeline_file,
        &title_list,
        &combined.start_times,
    )?;
    tracing::info!("timeline written to {}", project_paths.timeline_file.display());

    if video_mode {
        let source = background::resolve(&project_paths.background_dir)?;
        compose::compose(&source, &project_paths, &mut prober).await?;
        tracing::info!("done: {}", project_paths.output_video.display());
    } else {
        tracing::info!("done: {}", project_paths.combined_audio.display());
    }
    Ok(())
}

fn cmd_new(name: Option<String>) -> anyhow::Result<()> {
    let folder = match name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => timestamp_folder_name(),
    };
    let root = std::env::current_dir()?.join("projects").join(&folder);
    if root.exists() {
        bail!("project folder already exists: {}", root.display());
    }
    ProjectPaths::resolve(&root).scaffold()?;
    println!("Created project folder: {}", root.display());
    Ok(())
}

fn timestamp_folder_name() -> String {
    chrono::Local::now().format("%d.%m.%Y %H:%M:%S").to_string()
}
