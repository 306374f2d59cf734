//! CLI command implementations

pub mod build;
pub mod config;
pub mod mounts;
pub mod run;
pub mod status;

pub use build::execute as build;
pub use config::execute as config;
pub use mounts::execute as mounts;
pub use run::execute as run;
pub use status::execute as status;
