//! Diagnostics for labelprint.
//!
//! Everything is logged to stderr through `tracing`. Stdout belongs to the
//! external tools and to commands that print data (`config show`, `labels`).

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary reports about a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Progress and driver warnings.
    #[default]
    Normal,
    /// Also the tool command lines and scratch file names (`-v`).
    Verbose,
    /// Everything (`-vv`).
    Trace,
}

impl Verbosity {
    /// Most detailed level emitted at this verbosity.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive for this crate's events.
    #[must_use]
    pub fn directive(self) -> String {
        format!("labelprint={}", self.level())
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set and valid, replaces the filter derived from
/// `verbosity`. Calling this more than once keeps the first subscriber.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

/// Route warnings and errors into the test harness output.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.level(), Level::INFO);
        assert_eq!(Verbosity::Verbose.level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.level(), Level::TRACE);
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_directive_targets_crate() {
        assert_eq!(Verbosity::Quiet.directive(), "labelprint=ERROR");
        assert_eq!(Verbosity::Verbose.directive(), "labelprint=DEBUG");
    }

    #[test]
    fn test_init_logging_twice_keeps_first_subscriber() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
