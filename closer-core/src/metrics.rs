//! Fleet-level metrics summary over the whole task collection.

use crate::derive::roi;
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Average ROI strictly above this grades Excellent.
pub const EXCELLENT_ROI: f64 = 500.0;

/// Average ROI at or above this grades Good.
pub const GOOD_ROI: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceGrade {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceGrade {
    pub fn from_average_roi(avg_roi: f64) -> Self {
        if avg_roi > EXCELLENT_ROI {
            PerformanceGrade::Excellent
        } else if avg_roi >= GOOD_ROI {
            PerformanceGrade::Good
        } else {
            // NaN falls through here as well
            PerformanceGrade::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceGrade::Excellent => "Excellent",
            PerformanceGrade::Good => "Good",
            PerformanceGrade::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_revenue: f64,
    pub total_time_taken: f64,
    /// Share of tasks in Done, 0-100.
    pub time_efficiency_pct: f64,
    pub revenue_per_hour: f64,
    #[serde(rename = "averageROI")]
    pub average_roi: f64,
    pub performance_grade: PerformanceGrade,
}

impl Metrics {
    /// Summary reported for an empty collection.
    pub const EMPTY: Metrics = Metrics {
        total_revenue: 0.0,
        total_time_taken: 0.0,
        time_efficiency_pct: 0.0,
        revenue_per_hour: 0.0,
        average_roi: 0.0,
        performance_grade: PerformanceGrade::NeedsImprovement,
    };
}

impl Default for Metrics {
    fn default() -> Self {
        Self::EMPTY
    }
}

pub fn total_revenue(tasks: &[Task]) -> f64 {
    tasks.iter().map(|t| t.revenue).sum()
}

pub fn total_time_taken(tasks: &[Task]) -> f64 {
    tasks.iter().map(|t| t.time_taken).sum()
}

pub fn time_efficiency_pct(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let done = tasks.iter().filter(|t| t.is_done()).count();
    done as f64 / tasks.len() as f64 * 100.0
}

pub fn revenue_per_hour(tasks: &[Task]) -> f64 {
    let hours = total_time_taken(tasks);
    if hours > 0.0 {
        total_revenue(tasks) / hours
    } else {
        0.0
    }
}

pub fn average_roi(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    tasks.iter().map(roi).sum::<f64>() / tasks.len() as f64
}

/// Recompute the full summary. Pure: same tasks in, same metrics out.
pub fn aggregate(tasks: &[Task]) -> Metrics {
    if tasks.is_empty() {
        return Metrics::EMPTY;
    }

    let average_roi = average_roi(tasks);
    Metrics {
        total_revenue: total_revenue(tasks),
        total_time_taken: total_time_taken(tasks),
        time_efficiency_pct: time_efficiency_pct(tasks),
        revenue_per_hour: revenue_per_hour(tasks),
        average_roi,
        performance_grade: PerformanceGrade::from_average_roi(average_roi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskStatus};
    use chrono::{TimeZone, Utc};

    fn task(revenue: f64, hours: f64, status: TaskStatus) -> Task {
        Task {
            id: format!("{revenue}-{hours}"),
            title: "deal".to_string(),
            revenue,
            time_taken: hours,
            priority: Priority::Medium,
            status,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
            completed_at: None,
        }
    }

    #[test]
    fn test_empty_collection() {
        let m = aggregate(&[]);
        assert_eq!(m, Metrics::EMPTY);
        assert_eq!(m.performance_grade, PerformanceGrade::NeedsImprovement);
        assert_eq!(m.total_revenue, 0.0);
        assert_eq!(m.average_roi, 0.0);
    }

    #[test]
    fn test_totals_and_rates() {
        let tasks = vec![
            task(1000.0, 4.0, TaskStatus::Done),
            task(500.0, 1.0, TaskStatus::Todo),
            task(0.0, 5.0, TaskStatus::InProgress),
            task(300.0, 0.0, TaskStatus::Done),
        ];
        let m = aggregate(&tasks);
        assert_eq!(m.total_revenue, 1800.0);
        assert_eq!(m.total_time_taken, 10.0);
        assert_eq!(m.time_efficiency_pct, 50.0);
        assert_eq!(m.revenue_per_hour, 180.0);
        // rois: 250, 500, 0, 0 (zero-time guarded)
        assert_eq!(m.average_roi, 187.5);
        assert_eq!(m.performance_grade, PerformanceGrade::NeedsImprovement);
    }

    #[test]
    fn test_zero_hours_everywhere() {
        let tasks = vec![task(100.0, 0.0, TaskStatus::Todo), task(50.0, 0.0, TaskStatus::Todo)];
        let m = aggregate(&tasks);
        assert_eq!(m.revenue_per_hour, 0.0);
        assert_eq!(m.average_roi, 0.0);
        assert_eq!(m.time_efficiency_pct, 0.0);
        assert!(m.revenue_per_hour.is_finite());
    }

    #[test]
    fn test_negative_inputs_do_not_panic() {
        let tasks = vec![task(-100.0, 2.0, TaskStatus::Done), task(100.0, -2.0, TaskStatus::Todo)];
        let m = aggregate(&tasks);
        assert_eq!(m.total_time_taken, 0.0);
        assert_eq!(m.revenue_per_hour, 0.0);
        assert_eq!(m.average_roi, -25.0);
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(PerformanceGrade::from_average_roi(500.01), PerformanceGrade::Excellent);
        assert_eq!(PerformanceGrade::from_average_roi(500.0), PerformanceGrade::Good);
        assert_eq!(PerformanceGrade::from_average_roi(200.0), PerformanceGrade::Good);
        assert_eq!(PerformanceGrade::from_average_roi(199.99), PerformanceGrade::NeedsImprovement);
        assert_eq!(PerformanceGrade::from_average_roi(f64::NAN), PerformanceGrade::NeedsImprovement);
    }

    #[test]
    fn test_grade_is_monotonic() {
        fn rank(g: PerformanceGrade) -> u8 {
            match g {
                PerformanceGrade::NeedsImprovement => 0,
                PerformanceGrade::Good => 1,
                PerformanceGrade::Excellent => 2,
            }
        }
        let mut prev = 0;
        for step in 0..2000 {
            let g = rank(PerformanceGrade::from_average_roi(step as f64 * 0.5 - 100.0));
            assert!(g >= prev);
            prev = g;
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let tasks = vec![task(7000.0, 10.0, TaskStatus::Done), task(90.0, 3.0, TaskStatus::Todo)];
        assert_eq!(aggregate(&tasks), aggregate(&tasks));
        assert_eq!(aggregate(&tasks).performance_grade, PerformanceGrade::Good);
    }

    #[test]
    fn test_metrics_json_keys() {
        let json = serde_json::to_value(aggregate(&[])).unwrap();
        assert_eq!(json["averageROI"], 0.0);
        assert_eq!(json["timeEfficiencyPct"], 0.0);
        assert_eq!(json["performanceGrade"], "Needs Improvement");
    }
}
