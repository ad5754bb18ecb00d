//! Spinner display for steps that run an external tool with captured output

use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown on stderr while a quiet step runs.
///
/// Hidden when stderr is not a terminal, so CI logs and tests see nothing.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start a spinner with the given message
    pub fn start(message: impl Into<String>) -> Self {
        let bar = if Term::stderr().is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Remove the spinner from the terminal
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_start_and_finish() {
        let spinner = Spinner::start("Pushing web:latest");
        spinner.finish();
    }

    #[test]
    fn test_spinner_cleared_on_drop() {
        let spinner = Spinner::start("Retrieving digest");
        drop(spinner);
    }
}
