//! One-shot initial load of a [`TaskStore`].
//!
//! Policy:
//! - snapshot present and non-empty -> use it as-is
//! - snapshot absent, non-success status, or empty -> generate `seed_count` tasks
//! - transport / read / parse failure -> store enters its error state

use crate::generator::{generate, DEFAULT_SEED_COUNT};
use crate::snapshot::{load_snapshot, SnapshotSource};
use anyhow::Result;
use chrono::{DateTime, Utc};
use closer_core::{Clock, IdSource, Task, TaskStore};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub source: SnapshotSource,
    pub seed_count: usize,
    /// Fixed RNG seed for generated data; random when unset.
    pub rng_seed: Option<u64>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            source: SnapshotSource::None,
            seed_count: DEFAULT_SEED_COUNT,
            rng_seed: None,
        }
    }
}

/// Run the initial load into `store`. Returns false if the store had already
/// been loaded (or a load was already triggered), in which case nothing changes.
pub async fn bootstrap<C: Clock, I: IdSource>(store: &mut TaskStore<C, I>, opts: &BootstrapOptions) -> bool {
    if !store.begin_load() {
        return false;
    }
    let now = store.now();
    let result = load_initial(opts, now).await;
    store.finish_load(result);
    true
}

/// Resolve the initial collection without touching a store.
pub async fn load_initial(opts: &BootstrapOptions, now: DateTime<Utc>) -> Result<Vec<Task>> {
    info!(source = %opts.source, "loading tasks");
    match load_snapshot(&opts.source).await? {
        Some(tasks) if !tasks.is_empty() => Ok(tasks),
        _ => {
            info!(count = opts.seed_count, "no snapshot data; generating tasks");
            Ok(generate(opts.seed_count, opts.rng_seed, now))
        }
    }
}
