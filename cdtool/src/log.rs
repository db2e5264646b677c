// SPDX-License-Identifier: MIT

use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

impl LogLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => LogLevel::Verbose,
            (false, true) => LogLevel::Quiet,
            (false, false) => LogLevel::Normal,
        }
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn directives(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "error",
            LogLevel::Normal => "info",
            LogLevel::Verbose => "debug",
        }
    }
}

/// Installs the global subscriber. Events go to stderr so `read` output on
/// stdout stays clean.
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directives()));

    registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
