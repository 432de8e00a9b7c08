use crate::error::{CoreError, Result};
use crate::types::TimeUs;
use std::path::Path;

/// Write the human-readable timeline: one `H:MM:SS title` line per track, in
/// track order.
pub fn write_timeline(path: &Path, titles: &[String], start_times: &[TimeUs]) -> Result<()> {
    std::fs::write(path, render_lines(titles, start_times)?)?;
    Ok(())
}

fn render_lines(titles: &[String], start_times: &[TimeUs]) -> Result<String> {
    if titles.len() != start_times.len() {
        return Err(CoreError::TitleCountMismatch {
            titles: titles.len(),
            starts: start_times.len(),
        });
    }

    let mut out = String::new();
    for (title, start) in titles.iter().zip(start_times) {
        out.push_str(&format!("{} {}\n", start, title));
    }
    Ok(out)
}
