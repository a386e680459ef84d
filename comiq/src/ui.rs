//! Command-line UI. For now, this is just logging and a spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Command-line UI state.
#[derive(Clone, Debug)]
pub struct Ui {
    /// Should we show progress on stderr?
    show_progress: bool,
}

impl Ui {
    /// Create a new UI. This sets up logging.
    pub fn init() -> Ui {
        // Spinners and log lines both go to stderr and interleave badly, so we
        // only spin when nobody has asked for logs.
        env_logger::init();
        let show_progress = std::env::var_os("RUST_LOG").is_none();
        Ui { show_progress }
    }

    /// Create a new spinner with default settings. It will be hidden if we
    /// are logging.
    pub fn new_spinner(&self, msg: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let sp = ProgressBar::new_spinner()
            .with_style(default_spinner_style())
            .with_message(msg.to_owned());
        sp.enable_steady_tick(Duration::from_millis(100));
        sp
    }
}

fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner} {msg} {elapsed}")
        .expect("bad progress bar template")
}
