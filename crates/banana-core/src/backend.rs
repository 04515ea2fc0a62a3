use async_trait::async_trait;
use banana_model::{JobRequest, TaskLocator, TaskSnapshot};

use crate::error::BackendError;

/// Backend that runs asynchronous jobs.
///
/// This trait abstracts the transport, allowing the poller to be driven by:
/// - the HTTP client from `banana-client`
/// - scripted fakes in tests
#[async_trait]
pub trait TaskBackend: Send + Sync + 'static {
    /// Start a job and return where to observe it. Must not wait for completion.
    async fn submit(&self, job: &JobRequest) -> Result<TaskLocator, BackendError>;

    /// Read the current state of a job. Read-only.
    async fn status(&self, task: &TaskLocator) -> Result<TaskSnapshot, BackendError>;
}
