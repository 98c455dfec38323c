//! Derived task view: ROI + priority weight, and the ranking over them.
//!
//! Ranking:
//! - priority_weight DESC (High first)
//! - roi DESC
//! - input order when both tie (stable sort)

use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Read-only projection of a [`Task`] for display and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedTask {
    #[serde(flatten)]
    pub task: Task,
    pub roi: f64,
    pub priority_weight: u8,
}

impl std::ops::Deref for DerivedTask {
    type Target = Task;

    fn deref(&self) -> &Task {
        &self.task
    }
}

/// Revenue per hour of a single task. Zero when no time was logged or the
/// inputs are not finite numbers.
pub fn roi(task: &Task) -> f64 {
    if task.time_taken > 0.0 {
        let r = task.revenue / task.time_taken;
        if r.is_finite() { r } else { 0.0 }
    } else {
        0.0
    }
}

pub fn derive_one(task: &Task) -> DerivedTask {
    DerivedTask {
        task: task.clone(),
        roi: roi(task),
        priority_weight: task.priority.weight(),
    }
}

pub fn derive_all(tasks: &[Task]) -> Vec<DerivedTask> {
    tasks.iter().map(derive_one).collect()
}

/// Rank derived tasks. `sort_by` is stable, so equal keys keep input order.
pub fn sort_all(mut derived: Vec<DerivedTask>) -> Vec<DerivedTask> {
    derived.sort_by(rank);
    derived
}

pub fn derive_sorted(tasks: &[Task]) -> Vec<DerivedTask> {
    sort_all(derive_all(tasks))
}

fn rank(a: &DerivedTask, b: &DerivedTask) -> Ordering {
    b.priority_weight
        .cmp(&a.priority_weight)
        .then_with(|| roi_key(b).total_cmp(&roi_key(a)))
}

/// `total_cmp` key: non-finite ROI ranks as zero, and `-0.0` folds into `0.0`.
fn roi_key(d: &DerivedTask) -> f64 {
    if d.roi.is_finite() { d.roi + 0.0 } else { 0.0 }
}
