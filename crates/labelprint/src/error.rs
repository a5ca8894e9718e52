//! Error types for labelprint.
//!
//! Every failure the dispatcher can report lives in one enum so the binary can
//! map it onto a process exit status in a single place.

use std::path::PathBuf;
use thiserror::Error;

use crate::tools::ToolStatus;

/// Exit status for usage errors and every runtime failure.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status used when a dispatch was cut short by SIGINT or SIGTERM.
pub const EXIT_INTERRUPTED: u8 = 130;

/// The main error type for labelprint operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Usage Errors ===
    /// The command line was incomplete or malformed.
    #[error("usage: {message}")]
    Usage {
        /// What the operator got wrong.
        message: String,
    },

    /// The input path does not name an existing regular file.
    #[error("input file not found: {path}")]
    InputNotFound {
        /// The path as given on the command line.
        path: PathBuf,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// A `WIDTHxHEIGHT` value could not be parsed.
    #[error("invalid dimensions '{value}': expected WIDTHxHEIGHT with non-zero components")]
    InvalidDimensions {
        /// The rejected input.
        value: String,
    },

    // === External Tool Errors ===
    /// An external program could not be started at all.
    #[error("failed to run '{program}': {source}")]
    ToolSpawn {
        /// Program name or path.
        program: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The image converter reported failure.
    #[error("image conversion of {input} failed ({status})")]
    Conversion {
        /// The vector file that was being converted.
        input: PathBuf,
        /// Exit status of the converter.
        status: ToolStatus,
    },

    /// The printer driver reported failure and the policy treats that as fatal.
    #[error("printing {path} failed ({status})")]
    PrintFailed {
        /// The file the operator asked to print.
        path: PathBuf,
        /// Exit status of the driver.
        status: ToolStatus,
    },

    // === I/O Errors ===
    /// The scratch raster file could not be created or removed.
    #[error("temporary file error in {dir}: {source}")]
    TempFile {
        /// Directory the file was placed in.
        dir: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Lifecycle ===
    /// The operator interrupted the run.
    #[error("interrupted")]
    Interrupted,
}

/// A specialized Result type for labelprint operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new usage error.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a spawn error for the given program.
    #[must_use]
    pub fn tool_spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::ToolSpawn {
            program: program.into(),
            source,
        }
    }

    /// Check if this error is the operator's fault rather than the system's.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Usage { .. } | Self::InputNotFound { .. })
    }

    /// Check if this error was caused by an interrupt signal.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// Process exit status to report for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.is_interrupted() {
            EXIT_INTERRUPTED
        } else {
            EXIT_FAILURE
        }
    }
}
