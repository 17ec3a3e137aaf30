//! Command handlers behind the `straico` binaries.

pub mod complete;
pub mod config;
pub mod credential;
pub mod run;
pub mod shared;
