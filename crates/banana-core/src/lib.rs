//! Job submission and status polling for the banana client.
//!
//! A [`Poller`] submits a [`banana_model::JobRequest`] through a [`TaskBackend`], then follows
//! the task on a fixed interval until it completes, fails, runs out of attempts, hits its
//! wall-clock timeout or is cancelled. Every end state except cancellation produces exactly one
//! [`Notifier`] call and one terminal [`PollObserver`] callback.

mod backend;
pub use backend::TaskBackend;

mod error;
pub use error::{BackendError, ConfigError, JobError};

mod interpret;
pub use interpret::{
    ErrorView, GENERIC_FAILURE, Interpretation, ProgressView, ResultView, interpret, percent,
    progress_view,
};

mod notify;
pub use notify::{NoticeKind, Notifier, TracingNotifier};

mod poller;
pub use poller::*;

mod registry;
pub use registry::PollRegistry;

#[cfg(test)]
mod testing;
