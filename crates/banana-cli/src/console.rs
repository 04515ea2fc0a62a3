use std::{
    io::IsTerminal,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use banana_core::{JobError, NoticeKind, Notifier, PollObserver, ProgressView, ResultView};
use banana_model::{TaskLocator, TaskStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::cli::OutputFormat;

const BAR_TEMPLATE: &str = "{bar:30.cyan/blue} {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";

/// Terminal side of the CLI: notices and progress bars on stderr.
///
/// Bars are drawn only on an interactive stderr, in text mode, without `--quiet`.
#[derive(Clone)]
pub struct Console {
    progress: Option<MultiProgress>,
    quiet: bool,
}

impl Console {
    pub fn new(output: OutputFormat, quiet: bool) -> Self {
        let interactive = std::io::stderr().is_terminal();
        let progress = interactive && !quiet && output == OutputFormat::Text;
        Self {
            progress: progress.then(MultiProgress::new),
            quiet,
        }
    }

    #[cfg(test)]
    fn with_progress(progress: Option<MultiProgress>, quiet: bool) -> Self {
        Self { progress, quiet }
    }

    /// Print a line above any live bars.
    pub fn line(&self, text: &str) {
        match &self.progress {
            Some(multi) if multi.println(text).is_ok() => {}
            _ => eprintln!("{text}"),
        }
    }

    /// Progress display for one poll session.
    pub fn session(&self) -> ProgressPrinter {
        ProgressPrinter {
            multi: self.progress.clone(),
            bar: Mutex::new(None),
        }
    }
}

/// Prints notices, one line each.
#[derive(Clone)]
pub struct ConsoleNotifier {
    pub console: Console,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        // Errors are shown even in quiet mode.
        if self.console.quiet && kind != NoticeKind::Error {
            return;
        }
        self.console.line(&notice_line(message, kind));
    }
}

fn notice_line(message: &str, kind: NoticeKind) -> String {
    let tag = match kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
        NoticeKind::Info => "info",
        NoticeKind::Warning => "warn",
    };
    format!("[{tag}] {message}")
}

struct Tracker {
    bar: ProgressBar,
    counted: bool,
}

/// Drives one bar from a session's progress: counted when the job reports a total, a
/// spinner otherwise.
pub struct ProgressPrinter {
    multi: Option<MultiProgress>,
    bar: Mutex<Option<Tracker>>,
}

impl ProgressPrinter {
    fn tracker(&self) -> MutexGuard<'_, Option<Tracker>> {
        self.bar.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn close(&self, outcome: Option<&str>) {
        if let Some(tracker) = self.tracker().take() {
            match outcome {
                None => tracker.bar.finish_and_clear(),
                Some(message) => tracker.bar.abandon_with_message(message.to_string()),
            }
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl PollObserver for ProgressPrinter {
    fn on_update(&self, task: &TaskLocator, _attempt: u32, status: &TaskStatus, progress: &ProgressView) {
        let Some(multi) = &self.multi else {
            return;
        };
        let mut slot = self.tracker();
        let tracker = slot.get_or_insert_with(|| {
            let bar = multi.add(ProgressBar::new_spinner());
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            Tracker { bar, counted: false }
        });

        if progress.total > 0 {
            if !tracker.counted {
                tracker.bar.disable_steady_tick();
                tracker.bar.set_style(bar_style());
                tracker.counted = true;
            }
            tracker.bar.set_length(progress.total);
            tracker.bar.set_position(progress.completed.min(progress.total));
        }
        tracker.bar.set_message(progress_message(task, status, progress));
    }

    fn on_success(&self, _task: &TaskLocator, _result: &ResultView) {
        self.close(None);
    }

    fn on_failure(&self, _task: &TaskLocator, _error: &JobError) {
        self.close(Some("failed"));
    }

    fn on_timeout(&self, _task: &TaskLocator, _attempts: u32) {
        self.close(Some("still running"));
    }
}

fn progress_message(task: &TaskLocator, status: &TaskStatus, progress: &ProgressView) -> String {
    let mut line = format!("{task} {status} {}%", progress.percent);
    if let Some(step) = progress.current_step.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!(" {step}"));
    }
    if let Some(last) = progress.messages.last() {
        line.push_str(&format!(" ({last})"));
    }
    line
}
