mod lenient;

mod task_id;
pub use task_id::TaskId;

mod task_status;
pub use task_status::TaskStatus;

mod task_progress;
pub use task_progress::TaskProgress;

mod task_snapshot;
pub use task_snapshot::TaskSnapshot;

mod task_locator;
pub use task_locator::{GLOBAL_PROJECT, TaskLocator, TaskScope};

mod envelope;
pub use envelope::{Envelope, ErrorBody};

/// Timeout value in milliseconds.
pub type TimeoutMs = u64;
