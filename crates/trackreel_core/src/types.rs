use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

/// Microsecond-resolution time value. All timeline arithmetic happens at this
/// resolution so the strategy recurrences stay exact across re-runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);

    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000_000.0).round() as i64)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

/// `H:MM:SS` with unpadded hours and whole seconds, the format the timeline
/// export uses.
impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0.unsigned_abs() / 1_000_000;
        let secs = total_secs % 60;
        let mins = (total_secs / 60) % 60;
        let hours = total_secs / 3600;
        if self.0 < 0 {
            write!(f, "-{}:{:02}:{:02}", hours, mins, secs)
        } else {
            write!(f, "{}:{:02}:{:02}", hours, mins, secs)
        }
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// One source audio file, probed once and immutable afterwards. Ordering is
/// fixed by the discovery step (lexical filename sort).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub duration: TimeUs,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How consecutive tracks are joined in the combined output. Exactly one
/// strategy governs a run; it determines both the timeline arithmetic and the
/// ffmpeg plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Strategy {
    /// Silence of `gap` between every pair of consecutive tracks.
    Pause { gap: TimeUs },
    /// Fade-in/out inside each track's own span; tracks stay back-to-back.
    LinearFade { fade: TimeUs },
    /// Adjacent tracks overlap by `fade`.
    Crossfade { fade: TimeUs },
}

// ---------------------------------------------------------------------------
// TimelinePlan
// ---------------------------------------------------------------------------

/// Start time of every track in the combined output, aligned 1:1 with the
/// track list. `start_times[0]` is always zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePlan {
    pub start_times: Vec<TimeUs>,
}

// ---------------------------------------------------------------------------
// BackgroundSource
// ---------------------------------------------------------------------------

/// The visual source behind the combined audio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BackgroundSource {
    /// A single frame looped for the whole output.
    StaticImage(PathBuf),
    /// A single clip looped until the audio ends.
    SingleVideo(PathBuf),
    /// An ordered clip cycle, concatenated and repeated to cover the
    /// required duration.
    MultiVideoLoop(Vec<PathBuf>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
