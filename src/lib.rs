//! Mixpod - run mix builds in a container matching upstream
//!
//! Builds and caches one image per upstream format, mounts only the host
//! paths the mix configuration references and runs commands inside it.

pub mod cli;
pub mod config;
pub mod error;
pub mod image;
pub mod mounts;
pub mod orchestration;
pub mod runner;
pub mod ui;
pub mod upstream;

#[cfg(test)]
mod testutil;

pub use error::{MixpodError, MixpodResult};
