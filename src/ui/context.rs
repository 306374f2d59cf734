//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Environment variables that mark a CI run
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "JENKINS_URL",
    "BUILDKITE",
    "TF_BUILD",
];

/// UI context that determines output behavior
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment.
    ///
    /// Fancy output needs stderr and stdin on a terminal, no CI marker and
    /// no `MIXPOD_PLAIN` override.
    pub fn detect() -> Self {
        let on_terminal = std::io::stderr().is_terminal() && std::io::stdin().is_terminal();
        let forced_plain = std::env::var_os("MIXPOD_PLAIN").is_some();
        let in_ci = CI_VARS.iter().any(|var| std::env::var_os(var).is_some());

        Self {
            interactive: on_terminal && !forced_plain && !in_ci,
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}
