mod job;
pub use job::{JobKind, JobRequest, MaterialJob, ServiceKind};
