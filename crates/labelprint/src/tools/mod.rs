//! External collaborators.
//!
//! labelprint does no rasterization and speaks no printer protocol itself.
//! Both jobs are delegated to command-line tools behind the two traits in this
//! module:
//!
//! - [`ImageConverter`] turns a vector label into a raster of an exact size
//!   (ImageMagick, see [`ImageMagick`]).
//! - [`PrinterDriver`] sends a raster to the printer (`brother_ql`, see
//!   [`BrotherQl`]).
//!
//! The dispatcher only sees the traits, so tests substitute in-process fakes.

mod brother_ql;
mod imagemagick;
mod process;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::labels::Dimensions;

pub use brother_ql::BrotherQl;
pub use imagemagick::ImageMagick;
pub use process::run_tool;

/// Completion status of an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl ToolStatus {
    /// A status for a process that exited with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// A status for a process terminated by a signal.
    #[must_use]
    pub const fn signalled() -> Self {
        Self { code: None }
    }

    /// Whether the tool reported success (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ToolStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// A single vector-to-raster conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionJob<'a> {
    /// Vector image to rasterize.
    pub input: &'a Path,
    /// Where the raster must be written.
    pub output: &'a Path,
    /// Exact size of the resulting canvas.
    pub size: Dimensions,
}

/// A single print submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintJob<'a> {
    /// Printer device address.
    pub device: &'a str,
    /// Label-size code.
    pub label: &'a str,
    /// Raster image to print.
    pub file: &'a Path,
}

/// Converts vector images into rasters of an exact pixel size.
#[async_trait]
pub trait ImageConverter: Send + Sync {
    /// The name of this converter (for logging).
    fn name(&self) -> &str;

    /// Run one conversion and wait for it to finish.
    ///
    /// A non-zero status is returned as `Ok`; the caller decides what it means.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tool could not be run at all.
    async fn convert(&self, job: ConversionJob<'_>) -> Result<ToolStatus>;
}

/// Sends raster images to a printer.
#[async_trait]
pub trait PrinterDriver: Send + Sync {
    /// The name of this driver (for logging).
    fn name(&self) -> &str;

    /// Submit one print job and wait for the driver to exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tool could not be run at all.
    async fn print(&self, job: PrintJob<'_>) -> Result<ToolStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_status_success() {
        assert!(ToolStatus::exited(0).success());
        assert!(!ToolStatus::exited(1).success());
        assert!(!ToolStatus::signalled().success());
    }

    #[test]
    fn test_tool_status_display() {
        assert_eq!(ToolStatus::exited(3).to_string(), "exit code 3");
        assert_eq!(ToolStatus::signalled().to_string(), "terminated by signal");
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_status_from_exit_status() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(2 << 8);
        assert_eq!(ToolStatus::from(status), ToolStatus::exited(2));

        // Raw wait status 9: killed by SIGKILL
        let status = std::process::ExitStatus::from_raw(9);
        assert_eq!(ToolStatus::from(status), ToolStatus::signalled());
    }
}
