//! Terminal output for mixpod commands
//!
//! Uses `cliclack` spinners and log lines on a TTY, with plain prefixed
//! lines in CI or when output is redirected. Progress goes to stderr so a
//! contained command's stdout reaches the caller untouched.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, key_value_status, section, step_ok, step_warn};
pub use progress::TaskSpinner;
