use crate::constants::PROGRESS_BAR_TEMPLATE;
use crate::logger::is_quiet;
use crate::pipeline::{BatchReport, ProgressSink};
use crate::session::ProcessingStatus;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Terminal progress bar for the file currently being processed.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        if is_quiet() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_status(&self, status: &ProcessingStatus) {
        if status.progress_percent == 0 {
            self.bar.reset();
        }
        self.bar.set_message(format!("{} ({})", status.file_name, status.declared_format));
        self.bar.set_position(u64::from(status.progress_percent));
    }

    fn on_finished(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}
