use crate::error::{CoreError, Result};
use crate::types::{Strategy, TimeUs, TimelinePlan};

/// Compute the start time of every track in the combined output.
///
/// This is the single source of truth for elapsed time: the audio combiner
/// materializes the waveform consistent with this plan and never re-derives
/// start times. Per strategy, for i > 0:
///
/// - `Pause`:      `start[i] = start[i-1] + duration[i-1] + gap`
/// - `LinearFade`: `start[i] = start[i-1] + duration[i-1]`
/// - `Crossfade`:  `start[i] = start[i-1] + duration[i-1] - fade`
///
/// A crossfade longer than a chained track can drive later start times
/// negative; that is a defined edge case, not an error.
pub fn plan(durations: &[TimeUs], strategy: &Strategy) -> Result<TimelinePlan> {
    if durations.is_empty() {
        return Err(CoreError::EmptyTimeline);
    }
    if matches!(strategy, Strategy::Crossfade { .. }) && durations.len() < 2 {
        return Err(CoreError::InsufficientTracks(durations.len()));
    }

    let mut start_times = Vec::with_capacity(durations.len());
    let mut current = TimeUs::ZERO;
    for duration in durations {
        start_times.push(current);
        current = match strategy {
            Strategy::Pause { gap } => current + *duration + *gap,
            Strategy::LinearFade { .. } => current + *duration,
            Strategy::Crossfade { fade } => current + *duration - *fade,
        };
    }

    Ok(TimelinePlan { start_times })
}
