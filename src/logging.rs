use std::env;
use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    fn filter_spec(self) -> String {
        match self {
            Self::Quiet => "error".to_string(),
            Self::Verbose => "warn,straico=debug".to_string(),
            Self::Normal => env::var("RUST_LOG")
                .ok()
                .filter(|directives| !directives.trim().is_empty())
                .unwrap_or_else(|| "warn".to_string()),
        }
    }
}

/// Installs the stderr subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(verbosity.filter_spec()))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .try_init();
}
