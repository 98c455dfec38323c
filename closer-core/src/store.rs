//! TaskStore — the single source of truth for the task collection.
//!
//! - Owns the ordered collection (insertion order is the base order before ranking).
//! - Owns exactly one "last deleted" slot for single-level undo.
//! - Derived view and metrics are recomputed on every read, so they can never
//!   be stale relative to the collection.
//! - Load is at-most-once: `begin_load` latches, `finish_load` settles the
//!   store into ready or failed.

use crate::derive::{derive_sorted, DerivedTask};
use crate::metrics::{aggregate, Metrics};
use crate::providers::{Clock, IdSource, SystemClock, UuidIds};
use crate::task::{Task, TaskInput, TaskPatch, TaskStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// User-facing message when the initial load fails.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load tasks";

const MAX_ID_ATTEMPTS: usize = 64;

/// Owned snapshot of everything a presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreView {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
    pub derived_sorted: Vec<DerivedTask>,
    pub metrics: Metrics,
    pub last_deleted: Option<Task>,
}

#[derive(Debug, Clone)]
pub struct TaskStore<C: Clock = SystemClock, I: IdSource = UuidIds> {
    tasks: Vec<Task>,
    last_deleted: Option<Task>,
    loading: bool,
    load_started: bool,
    error: Option<String>,
    clock: C,
    ids: I,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_providers(SystemClock, UuidIds)
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, I: IdSource> TaskStore<C, I> {
    /// A store waiting for its initial load.
    pub fn with_providers(clock: C, ids: I) -> Self {
        Self {
            tasks: Vec::new(),
            last_deleted: None,
            loading: true,
            load_started: false,
            error: None,
            clock,
            ids,
        }
    }

    /// A store that starts from a known collection; no load will run.
    pub fn from_tasks(tasks: Vec<Task>, clock: C, ids: I) -> Self {
        let mut store = Self::with_providers(clock, ids);
        store.adopt(tasks);
        store.loading = false;
        store.load_started = true;
        store
    }

    // ----- load lifecycle -----

    /// Latch the initial load. Returns false if a load was already started.
    pub fn begin_load(&mut self) -> bool {
        if self.load_started {
            debug!("load already started; ignoring duplicate trigger");
            return false;
        }
        self.load_started = true;
        self.loading = true;
        self.error = None;
        true
    }

    /// Settle the initial load.
    ///
    /// On failure the collection is emptied and the store reports
    /// [`LOAD_ERROR_MESSAGE`]; the underlying cause goes to the log.
    pub fn finish_load(&mut self, result: Result<Vec<Task>>) {
        if !self.loading {
            warn!("finish_load called with no load in flight; ignoring");
            return;
        }
        self.load_started = true;
        self.loading = false;

        match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "tasks loaded");
                self.adopt(tasks);
                self.error = None;
            }
            Err(e) => {
                error!("task load failed: {e:#}");
                self.tasks.clear();
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ----- reads -----

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn last_deleted(&self) -> Option<&Task> {
        self.last_deleted.as_ref()
    }

    pub fn derived_sorted(&self) -> Vec<DerivedTask> {
        derive_sorted(&self.tasks)
    }

    pub fn metrics(&self) -> Metrics {
        aggregate(&self.tasks)
    }

    pub fn view(&self) -> StoreView {
        StoreView {
            tasks: self.tasks.clone(),
            loading: self.loading,
            error: self.error.clone(),
            derived_sorted: self.derived_sorted(),
            metrics: self.metrics(),
            last_deleted: self.last_deleted.clone(),
        }
    }

    // ----- mutations -----

    /// Append a new task and return its id.
    ///
    /// A supplied id that is already live (or parked in the undo slot) is
    /// replaced with a fresh one.
    pub fn add(&mut self, input: TaskInput) -> String {
        let id = match input.id {
            Some(id) if !self.id_taken(&id) => id,
            Some(id) => {
                let fresh = self.fresh_id();
                warn!(requested = %id, assigned = %fresh, "task id already in use; assigned a new one");
                fresh
            }
            None => self.fresh_id(),
        };

        let created_at = self.clock.now();
        let completed_at = (input.status == TaskStatus::Done).then_some(created_at);

        self.tasks.push(Task {
            id: id.clone(),
            title: input.title,
            revenue: input.revenue,
            time_taken: input.time_taken,
            priority: input.priority,
            status: input.status,
            notes: input.notes,
            created_at,
            completed_at,
        });
        debug!(%id, "task added");
        id
    }

    /// Merge `patch` over the task with `id`. Unknown ids are ignored.
    ///
    /// A status change to Done does not stamp `completed_at`.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.apply(patch);
                debug!(%id, "task updated");
            }
            None => debug!(%id, "update for unknown task ignored"),
        }
    }

    /// Remove the task with `id` into the undo slot, replacing whatever was there.
    pub fn delete(&mut self, id: &str) {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(%id, "delete for unknown task ignored");
            return;
        };
        let removed = self.tasks.remove(pos);
        if let Some(dropped) = self.last_deleted.replace(removed) {
            debug!(id = %dropped.id, "undo slot overwritten");
        }
        debug!(%id, "task deleted");
    }

    /// Re-append the last deleted task at the end of the collection.
    pub fn undo_delete(&mut self) {
        match self.last_deleted.take() {
            Some(task) => {
                debug!(id = %task.id, "delete undone");
                self.tasks.push(task);
            }
            None => debug!("nothing to undo"),
        }
    }

    /// Replace the collection, re-drawing any id already seen earlier in `tasks`.
    fn adopt(&mut self, tasks: Vec<Task>) {
        self.tasks = Vec::with_capacity(tasks.len());
        let mut seen: HashSet<String> = HashSet::with_capacity(tasks.len());
        for mut task in tasks {
            if seen.contains(&task.id) {
                let fresh = self.fresh_id();
                warn!(duplicate = %task.id, assigned = %fresh, "duplicate task id in loaded data; assigned a new one");
                task.id = fresh;
            }
            seen.insert(task.id.clone());
            self.tasks.push(task);
        }
    }

    fn id_taken(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == id)
            || self.last_deleted.as_ref().is_some_and(|t| t.id == id)
    }

    fn fresh_id(&mut self) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !self.id_taken(&id) {
                return id;
            }
        }
        // The configured source keeps colliding; fall back to random ids.
        let mut uuids = UuidIds;
        loop {
            let id = uuids.next_id();
            if !self.id_taken(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PerformanceGrade;
    use crate::providers::{FixedClock, SequentialIds};
    use crate::task::Priority;
    use anyhow::anyhow;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap()
    }

    fn store() -> TaskStore<FixedClock, SequentialIds> {
        TaskStore::from_tasks(Vec::new(), FixedClock(t0()), SequentialIds::new("t"))
    }

    fn input(title: &str, revenue: f64, hours: f64, priority: Priority) -> TaskInput {
        TaskInput::new(title, revenue, hours).with_priority(priority)
    }

    #[test]
    fn test_add_assigns_id_and_timestamps() {
        let mut s = store();
        let id = s.add(input("Prospect list", 0.0, 2.0, Priority::Low));
        assert_eq!(id, "t-1");

        let t = s.get(&id).unwrap();
        assert_eq!(t.created_at, t0());
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_add_done_stamps_completed_at() {
        let mut s = store();
        let id = s.add(input("Signed contract", 5000.0, 6.0, Priority::High).with_status(TaskStatus::Done));
        let t = s.get(&id).unwrap();
        assert_eq!(t.completed_at, Some(t.created_at));
    }

    #[test]
    fn test_add_keeps_supplied_id_and_appends() {
        let mut s = store();
        s.add(input("a", 1.0, 1.0, Priority::Low));
        let id = s.add(input("b", 1.0, 1.0, Priority::Low).with_id("custom"));
        assert_eq!(id, "custom");
        assert_eq!(s.tasks().last().unwrap().id, "custom");
    }

    #[test]
    fn test_add_replaces_colliding_id() {
        let mut s = store();
        s.add(input("a", 1.0, 1.0, Priority::Low).with_id("dup"));
        let second = s.add(input("b", 1.0, 1.0, Priority::Low).with_id("dup"));
        assert_ne!(second, "dup");
        assert_eq!(s.len(), 2);
        assert_eq!(s.tasks().iter().filter(|t| t.id == "dup").count(), 1);
    }

    #[test]
    fn test_generated_id_skips_live_and_buffered_ids() {
        let mut s = store();
        s.add(input("a", 1.0, 1.0, Priority::Low).with_id("t-1"));
        s.add(input("b", 1.0, 1.0, Priority::Low).with_id("t-2"));
        s.delete("t-2");
        let id = s.add(input("c", 1.0, 1.0, Priority::Low));
        assert_eq!(id, "t-3");

        s.undo_delete();
        let mut ids: Vec<&str> = s.tasks().iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["t-1", "t-2", "t-3"]);
    }

    #[test]
    fn test_update_merges_patch() {
        let mut s = store();
        let id = s.add(input("Demo", 100.0, 2.0, Priority::Low));
        s.update(&id, &TaskPatch::default().revenue(900.0).priority(Priority::High).notes("moved up"));

        let t = s.get(&id).unwrap();
        assert_eq!(t.revenue, 900.0);
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.notes.as_deref(), Some("moved up"));
        assert_eq!(t.title, "Demo");
        assert_eq!(s.derived_sorted()[0].roi, 450.0);
    }

    #[test]
    fn test_update_to_done_does_not_stamp() {
        let mut s = store();
        let id = s.add(input("Follow up", 10.0, 1.0, Priority::Medium));
        s.update(&id, &TaskPatch::default().status(TaskStatus::Done));
        let t = s.get(&id).unwrap();
        assert!(t.is_done());
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let mut s = store();
        s.add(input("a", 100.0, 10.0, Priority::High));
        s.add(input("b", 50.0, 5.0, Priority::Low).with_status(TaskStatus::Done));
        let before = s.view();

        s.update("missing", &TaskPatch::default().title("ghost").revenue(1e9));
        assert_eq!(s.view(), before);
        assert_eq!(
            serde_json::to_string(&s.view()).unwrap(),
            serde_json::to_string(&before).unwrap()
        );
    }

    #[test]
    fn test_delete_unknown_id_keeps_buffer() {
        let mut s = store();
        let a = s.add(input("a", 1.0, 1.0, Priority::Low));
        s.delete(&a);
        s.delete("missing");
        assert_eq!(s.last_deleted().map(|t| t.id.as_str()), Some(a.as_str()));
    }

    #[test]
    fn test_delete_then_undo_round_trip() {
        let mut s = store();
        s.add(input("first", 1.0, 1.0, Priority::Low));
        let id = s.add(input("Quarterly review", 2500.0, 5.0, Priority::Medium).with_notes("bring deck"));
        s.add(input("last", 1.0, 1.0, Priority::Low));
        let original = s.get(&id).unwrap().clone();

        s.delete(&id);
        assert!(s.get(&id).is_none());
        assert_eq!(s.last_deleted(), Some(&original));

        s.undo_delete();
        assert_eq!(s.get(&id), Some(&original));
        assert!(s.last_deleted().is_none());
        // restored at the end, not at its old index
        assert_eq!(s.tasks().last().unwrap().id, id);
    }

    #[test]
    fn test_second_delete_discards_first() {
        let mut s = store();
        let a = s.add(input("A", 1.0, 1.0, Priority::Low));
        let b = s.add(input("B", 1.0, 1.0, Priority::Low));

        s.delete(&a);
        s.delete(&b);
        s.undo_delete();

        assert!(s.get(&b).is_some());
        assert!(s.get(&a).is_none());
        assert!(s.last_deleted().is_none());

        // a second undo has nothing left
        s.undo_delete();
        assert!(s.get(&a).is_none());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_undo_with_empty_buffer_is_noop() {
        let mut s = store();
        s.add(input("a", 1.0, 1.0, Priority::Low));
        let before = s.view();
        s.undo_delete();
        assert_eq!(s.view(), before);
    }

    #[test]
    fn test_view_tracks_mutations() {
        let mut s = store();
        assert_eq!(s.metrics(), Metrics::EMPTY);

        let low = s.add(input("low", 50.0, 5.0, Priority::Low));
        s.add(input("high", 100.0, 10.0, Priority::High));
        let v = s.view();
        assert_eq!(v.derived_sorted[0].title, "high");
        assert_eq!(v.metrics.total_revenue, 150.0);

        s.delete(&low);
        let after = s.view();
        assert_eq!(after.metrics.total_revenue, 100.0);
        assert_eq!(after.derived_sorted.len(), 1);
        // earlier snapshot is an independent copy
        assert_eq!(v.derived_sorted.len(), 2);
    }

    #[test]
    fn test_metrics_follow_updates() {
        let mut s = store();
        let id = s.add(input("Enterprise deal", 3000.0, 10.0, Priority::High));
        assert_eq!(s.metrics().performance_grade, PerformanceGrade::Good);
        s.update(&id, &TaskPatch::default().time_taken(2.0));
        assert_eq!(s.metrics().performance_grade, PerformanceGrade::Excellent);
    }

    #[test]
    fn test_load_is_at_most_once() {
        let mut s: TaskStore<FixedClock, SequentialIds> =
            TaskStore::with_providers(FixedClock(t0()), SequentialIds::new("t"));
        assert!(s.is_loading());
        assert!(s.begin_load());
        assert!(!s.begin_load());

        s.finish_load(Ok(vec![]));
        assert!(!s.is_loading());
        assert!(s.error().is_none());
        assert!(!s.begin_load());
    }

    #[test]
    fn test_load_failure_sets_error_and_empties() {
        let mut s: TaskStore<FixedClock, SequentialIds> =
            TaskStore::with_providers(FixedClock(t0()), SequentialIds::new("t"));
        assert!(s.begin_load());
        s.finish_load(Err(anyhow!("connection refused")));

        assert!(!s.is_loading());
        assert_eq!(s.error(), Some(LOAD_ERROR_MESSAGE));
        assert!(s.is_empty());
        assert_eq!(s.view().metrics, Metrics::EMPTY);
    }

    #[test]
    fn test_finish_without_load_in_flight_is_ignored() {
        let mut s = store();
        s.add(input("keep", 1.0, 1.0, Priority::Low));
        s.finish_load(Err(anyhow!("late failure")));
        assert_eq!(s.len(), 1);
        assert!(s.error().is_none());
    }

    #[test]
    fn test_loaded_duplicate_ids_are_redrawn() {
        let loaded = |id: &str, title: &str| Task {
            id: id.to_string(),
            title: title.to_string(),
            revenue: 100.0,
            time_taken: 1.0,
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            notes: None,
            created_at: t0(),
            completed_at: None,
        };
        let mut s: TaskStore<FixedClock, SequentialIds> =
            TaskStore::with_providers(FixedClock(t0()), SequentialIds::new("t"));
        assert!(s.begin_load());
        s.finish_load(Ok(vec![loaded("a", "first"), loaded("a", "second"), loaded("b", "third")]));

        let ids: Vec<&str> = s.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "t-1", "b"]);

        s.delete("t-1");
        assert_eq!(s.get("a").unwrap().title, "first");
        assert_eq!(s.last_deleted().unwrap().title, "second");

        let s2 = TaskStore::from_tasks(vec![loaded("x", "1"), loaded("x", "2")], FixedClock(t0()), SequentialIds::new("n"));
        assert_eq!(s2.tasks()[1].id, "n-1");
    }
}
