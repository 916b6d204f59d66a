//! Human-readable and JSON listings of scan and merge results.

use mpegrecover_core::{Fragment, Recording, Timestamp};
use serde::Serialize;
use std::fmt::Write;

/// Recording summary for JSON output.
#[derive(Debug, Serialize)]
pub struct RecordingSummary<'a> {
    pub index: usize,
    pub block_count: u64,
    pub duration: Timestamp,
    pub discarded: bool,
    pub fragments: &'a [Fragment],
}

impl<'a> RecordingSummary<'a> {
    pub fn new(index: usize, recording: &'a Recording, discarded: bool) -> Self {
        Self {
            index,
            block_count: recording.block_count(),
            duration: recording.duration(),
            discarded,
            fragments: recording.fragments(),
        }
    }
}

/// Render the fragment list as a table.
pub fn fragment_table(fragments: &[Fragment]) -> String {
    let width = index_width(fragments.len());
    let mut out = String::new();

    let rule = format!(
        "{}-+--------------+--------------+--------------+--------------+--------------",
        "-".repeat(width)
    );
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:>width$} |  Block Start |  Block Count |  Clock Start |    Clock End |     Duration",
        "#"
    );
    let _ = writeln!(out, "{}", rule);

    for (i, f) in fragments.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>width$} | {:>12} | {:>12} | {:>12} | {:>12} | {:>12}",
            i,
            f.start_block,
            f.block_count,
            f.start_time.ticks(),
            f.end_time.ticks(),
            f.duration().to_string(),
        );
    }

    out
}

/// Render recordings, one header line each followed by their fragments.
pub fn recording_list(recordings: &[Recording], discarded: impl Fn(&Recording) -> bool) -> String {
    let mut out = String::new();

    for (i, recording) in recordings.iter().enumerate() {
        let _ = write!(
            out,
            "Recording #{}: {} fragments, {} blocks, {}",
            i,
            recording.len(),
            recording.block_count(),
            recording.duration()
        );
        if discarded(recording) {
            let _ = write!(out, " [discarded]");
        }
        let _ = writeln!(out);

        for f in recording {
            let _ = writeln!(
                out,
                "  blocks {}..{}  clock {} - {}",
                f.start_block,
                f.end_block(),
                f.start_time,
                f.end_time
            );
        }
    }

    out
}

fn index_width(count: usize) -> usize {
    count.saturating_sub(1).to_string().len()
}
