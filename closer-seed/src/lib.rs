//! closer-seed: initial data for the task store (snapshot loading with a
//! synthetic fallback) and export writers.

pub mod bootstrap;
pub mod error;
pub mod export;
pub mod generator;
pub mod snapshot;

pub use bootstrap::{bootstrap, load_initial, BootstrapOptions};
pub use error::LoadError;
pub use export::{write_ranked_csv, write_ranked_json, write_snapshot_json};
pub use generator::{generate, generate_sales_tasks, generate_seeded, DEFAULT_SEED_COUNT};
pub use snapshot::{load_snapshot, SnapshotSource};
