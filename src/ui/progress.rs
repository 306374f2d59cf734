//! Progress spinner with CI fallback

use super::context::UiContext;
use console::style;

/// A task spinner; plain stderr lines outside a terminal
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner, or update its message if already running
    pub fn start(&mut self, message: &str) {
        if !self.interactive {
            eprintln!("{} {}", style("...").dim(), message);
            return;
        }

        match self.spinner {
            Some(ref spinner) => spinner.start(message),
            None => {
                let spinner = cliclack::spinner();
                spinner.start(message);
                self.spinner = Some(spinner);
            }
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => eprintln!("{} {}", style("[OK]").green(), message),
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => eprintln!("{} {}", style("[FAIL]").red(), message),
        }
    }

    /// Remove the spinner without a message
    pub fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
    }
}
