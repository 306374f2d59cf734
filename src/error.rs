//! Error types for mixpod
//!
//! All modules use `MixpodResult<T>` as their return type. Wrapping variants
//! keep the inner error as `#[source]` so the CLI can print the whole chain.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mixpod operations
pub type MixpodResult<T> = Result<T, MixpodError>;

/// All errors that can occur in mixpod
#[derive(Error, Debug)]
pub enum MixpodError {
    // Environment errors
    #[error("Container runtime not found: {program}")]
    RuntimeNotFound { program: String },

    #[error("Upstream version is not set")]
    UpstreamVersionUnset,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("Failed to create config directory {}", path.display())]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Upstream errors
    #[error("Failed to fetch {url}: {reason}")]
    UpstreamFetch { url: String, reason: String },

    #[error("Invalid {what} from upstream: {value:?}")]
    UpstreamInvalid { what: String, value: String },

    #[error("Failed to resolve format for upstream version {version}")]
    FormatResolve {
        version: String,
        #[source]
        source: Box<MixpodError>,
    },

    #[error("Failed to download image base for version {version} to {}", dest.display())]
    ArchiveFetch {
        version: String,
        dest: PathBuf,
        #[source]
        source: Box<MixpodError>,
    },

    // Image errors
    #[error("Error checking for image {image}")]
    ImageQuery {
        image: String,
        #[source]
        source: Box<MixpodError>,
    },

    #[error("Error fetching image base for {image}")]
    ImageFetch {
        image: String,
        #[source]
        source: Box<MixpodError>,
    },

    #[error("Failed to build image {image}: {reason}")]
    ImageBuild { image: String, reason: String },

    // Container errors
    #[error("No command given to run")]
    EmptyCommand,

    #[error("Failed to run command in container: {command}, exit code: {code}")]
    ContainerRun { command: String, code: i32 },

    #[error("Command exited with code {code}: {command}")]
    NativeRun { command: String, code: i32 },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("Failed to serialize JSON")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize configuration")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MixpodError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Exit code the CLI should use for this error.
    ///
    /// A command that ran and failed passes its own code through (clamped to
    /// 1..=255); everything else is a plain failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ContainerRun { code, .. } | Self::NativeRun { code, .. } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RuntimeNotFound { .. } => {
                Some("Install docker or podman, or set container.runtime in the config")
            }
            Self::UpstreamVersionUnset => Some("Set upstream.version in the config"),
            Self::ConfigExists(_) => Some("Pass --force to overwrite it"),
            _ => None,
        }
    }
}
