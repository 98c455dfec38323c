//! Plain-text rendering of the ranked view and the metrics summary.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use closer_core::{DerivedTask, Metrics, Task};
use std::fmt::Write;

const ID_WIDTH: usize = 8;

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(ID_WIDTH) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

pub fn local_time(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_metrics(m: &Metrics) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "## Metrics\n");
    let _ = writeln!(s, "Total revenue     ${:.2}", m.total_revenue);
    let _ = writeln!(s, "Total time        {:.1} h", m.total_time_taken);
    let _ = writeln!(s, "Time efficiency   {:.1}%", m.time_efficiency_pct);
    let _ = writeln!(s, "Revenue / hour    ${:.2}", m.revenue_per_hour);
    let _ = writeln!(s, "Average ROI       {:.2}", m.average_roi);
    let _ = writeln!(s, "Grade             {}", m.performance_grade.label());
    s
}

pub fn render_ranked(ranked: &[DerivedTask], limit: usize, tz: Tz) -> String {
    let mut s = String::new();
    let shown = limit.min(ranked.len());
    let _ = writeln!(s, "## Ranked tasks ({shown} of {})\n", ranked.len());
    let _ = writeln!(
        s,
        "{:>3}  {:<8}  {:<6}  {:<11}  {:>10}  {:>6}  {:>9}  {:<16}  title",
        "#", "id", "prio", "status", "revenue", "hours", "roi", "created"
    );
    for (i, d) in ranked.iter().take(limit).enumerate() {
        let _ = writeln!(
            s,
            "{:>3}  {:<8}  {:<6}  {:<11}  {:>10.2}  {:>6.1}  {:>9.2}  {:<16}  {}",
            i + 1,
            short_id(&d.id),
            d.priority.label(),
            d.status.label(),
            d.revenue,
            d.time_taken,
            d.roi,
            local_time(d.created_at, tz),
            d.title
        );
    }
    s
}

pub fn render_task(t: &Task, tz: Tz) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{}  {}", t.id, t.title);
    let _ = writeln!(
        s,
        "  {} / {} | ${:.2} over {:.1} h",
        t.priority.label(),
        t.status.label(),
        t.revenue,
        t.time_taken
    );
    let _ = writeln!(s, "  created   {}", local_time(t.created_at, tz));
    if let Some(done) = t.completed_at {
        let _ = writeln!(s, "  completed {}", local_time(done, tz));
    }
    if let Some(notes) = &t.notes {
        let _ = writeln!(s, "  notes     {notes}");
    }
    s
}
