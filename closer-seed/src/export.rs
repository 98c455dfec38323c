//! Write task collections and ranked views out as JSON or CSV.

use anyhow::{Context, Result};
use closer_core::{DerivedTask, Task};
use serde::Serialize;
use std::io::Write;

/// One CSV line of the ranked view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RankedRow<'a> {
    rank: usize,
    id: &'a str,
    title: &'a str,
    priority: &'static str,
    status: &'static str,
    revenue: f64,
    time_taken: f64,
    roi: f64,
    priority_weight: u8,
    created_at: String,
    completed_at: String,
    notes: &'a str,
}

impl<'a> RankedRow<'a> {
    fn new(rank: usize, d: &'a DerivedTask) -> Self {
        Self {
            rank,
            id: &d.id,
            title: &d.title,
            priority: d.priority.label(),
            status: d.status.label(),
            revenue: d.revenue,
            time_taken: d.time_taken,
            roi: round2(d.roi),
            priority_weight: d.priority_weight,
            created_at: d.created_at.to_rfc3339(),
            completed_at: d.completed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            notes: d.notes.as_deref().unwrap_or(""),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Ranked view as CSV, one row per task in the given order.
pub fn write_ranked_csv<W: Write>(out: W, ranked: &[DerivedTask]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for (i, d) in ranked.iter().enumerate() {
        wtr.serialize(RankedRow::new(i + 1, d)).context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

/// Ranked view as a pretty JSON array.
pub fn write_ranked_json<W: Write>(out: W, ranked: &[DerivedTask]) -> Result<()> {
    serde_json::to_writer_pretty(out, ranked).context("serialize ranked tasks")?;
    Ok(())
}

/// Raw tasks in the snapshot format `load_snapshot` reads back.
pub fn write_snapshot_json<W: Write>(out: W, tasks: &[Task]) -> Result<()> {
    serde_json::to_writer_pretty(out, tasks).context("serialize snapshot")?;
    Ok(())
}
