//! `brother_ql` printer driver.

use std::ffi::OsString;

use async_trait::async_trait;

use super::{run_tool, PrintJob, PrinterDriver, ToolStatus};
use crate::config::PrinterConfig;
use crate::error::Result;

/// Prints through the `brother_ql` command-line tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrotherQl {
    program: String,
    model: Option<String>,
    backend: Option<String>,
    extra_args: Vec<String>,
}

impl BrotherQl {
    /// Create a driver running `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Create a driver from the `[printer]` configuration section.
    #[must_use]
    pub fn from_config(config: &PrinterConfig) -> Self {
        Self {
            program: config.program.clone(),
            model: config.model.clone(),
            backend: config.backend.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Build the argument list for one print job.
    ///
    /// Global options go before the `print` subcommand, label options after.
    #[must_use]
    pub fn args(&self, job: &PrintJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if let Some(model) = &self.model {
            args.push("--model".into());
            args.push(model.into());
        }
        if let Some(backend) = &self.backend {
            args.push("--backend".into());
            args.push(backend.into());
        }
        args.push("--printer".into());
        args.push(job.device.into());
        args.push("print".into());
        args.push("--label".into());
        args.push(job.label.into());
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(job.file.into());
        args
    }
}

#[async_trait]
impl PrinterDriver for BrotherQl {
    fn name(&self) -> &str {
        &self.program
    }

    async fn print(&self, job: PrintJob<'_>) -> Result<ToolStatus> {
        run_tool(&self.program, self.args(&job)).await
    }
}
