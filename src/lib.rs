//! Command-line adapter for the Straico generative-AI API.
//!
//! The [`straico`] module holds the request-building and batch-processing
//! core; [`commands`] wires it to the `straico` binaries.

pub mod commands;
pub mod config;
pub mod logging;
pub mod straico;

/// Version string with build metadata stamped by `build.rs`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("STRAICO_GIT_SHA"),
    ", built: ",
    env!("STRAICO_BUILD_TS"),
    ")"
);
