//! closer-core: task model, derivation, metrics and the task store.

pub mod derive;
pub mod metrics;
pub mod providers;
pub mod store;
pub mod task;

pub use derive::{derive_all, derive_one, derive_sorted, sort_all, DerivedTask};
pub use metrics::{aggregate, Metrics, PerformanceGrade};
pub use providers::{Clock, FixedClock, IdSource, SequentialIds, SystemClock, UuidIds};
pub use store::{StoreView, TaskStore, LOAD_ERROR_MESSAGE};
pub use task::{Priority, Task, TaskInput, TaskPatch, TaskStatus};
