use std::fmt;

use tracing::{error, info, warn};

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// Sink for user-visible notifications.
///
/// Injected into the poller; every terminal outcome of a session produces exactly one call.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);
}

impl<F> Notifier for F
where
    F: Fn(&str, NoticeKind) + Send + Sync,
{
    fn notify(&self, message: &str, kind: NoticeKind) {
        self(message, kind)
    }
}

/// Notifier that forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Success | NoticeKind::Info => info!(target: "banana.notice", %kind, "{message}"),
            NoticeKind::Warning => warn!(target: "banana.notice", %kind, "{message}"),
            NoticeKind::Error => error!(target: "banana.notice", %kind, "{message}"),
        }
    }
}
