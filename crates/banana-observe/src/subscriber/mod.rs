mod journal;
mod view;

pub use journal::Journal;
pub use view::{EventKind, PollEvent, log_event, message_for};
