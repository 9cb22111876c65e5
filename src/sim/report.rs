use std::{collections::BTreeMap, fmt, fmt::Write};

use average::{Estimate, Mean};

use super::job::{Metrics, Pid};
use crate::core::state::{Segment, Ticks};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
}

impl Summary {
    pub fn from_metrics(metrics: &BTreeMap<Pid, Metrics>) -> Option<Self> {
        if metrics.is_empty() {
            return None;
        }

        Some(Self {
            avg_waiting_time: avg(metrics.values().map(|m| m.waiting_time as f64)),
            avg_turnaround_time: avg(metrics.values().map(|m| m.turnaround_time as f64)),
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average Waiting Time: {:.2}", self.avg_waiting_time)?;
        write!(f, "Average Turnaround Time: {:.2}", self.avg_turnaround_time)
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

// Cycled per distinct pid, like a ten-colour plot palette
const GLYPHS: &[u8] = b"ABCDEFGHIJ";

// Widest CPU row; longer timelines are scaled down to fit
pub const GANTT_WIDTH: usize = 64;

// Text Gantt chart: one line per segment, then a CPU row where each column
// shows the pid holding the CPU for most of that column's ticks
pub fn format_gantt(segments: &[Segment]) -> String {
    let Some(makespan) = segments.iter().map(|s| s.end).max() else {
        return String::new();
    };

    let glyphs: BTreeMap<Pid, char> = {
        let mut pids: Vec<Pid> = segments.iter().map(|s| s.pid).collect();
        pids.sort_unstable();
        pids.dedup();
        pids.into_iter()
            .enumerate()
            .map(|(i, pid)| (pid, GLYPHS[i % GLYPHS.len()] as char))
            .collect()
    };

    let mut out = String::new();
    for segment in segments {
        let _ = writeln!(
            out,
            "{} P{} [{}, {})",
            glyphs[&segment.pid], segment.pid, segment.start, segment.end
        );
    }

    let mut ordered = segments.to_vec();
    ordered.sort_by_key(|s| s.start);

    // One column per tick while that fits
    let cols = usize::try_from(makespan).map_or(GANTT_WIDTH, |m| m.min(GANTT_WIDTH));
    let mut row = String::with_capacity(cols);
    let mut first = 0;
    for col in 0..cols {
        let (lo, hi) = column_ticks(col, cols, makespan);
        first += ordered[first..].partition_point(|s| s.end <= lo);
        let owner = ordered[first..]
            .iter()
            .take_while(|s| s.start < hi)
            .max_by_key(|s| s.end.min(hi) - s.start.max(lo));
        row.push(owner.map_or('.', |s| glyphs[&s.pid]));
    }
    let _ = write!(out, "CPU |{row}| {makespan}");
    out
}

// Tick range [lo, hi) covered by column `col` of `cols`
fn column_ticks(col: usize, cols: usize, makespan: Ticks) -> (Ticks, Ticks) {
    let at = |c: usize| {
        let tick = c as u128 * u128::from(makespan) / cols as u128;
        Ticks::try_from(tick).unwrap_or(makespan)
    };
    (at(col), at(col + 1))
}
