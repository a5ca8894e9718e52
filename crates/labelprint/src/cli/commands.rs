//! CLI argument and subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::labels::Dimensions;

/// Arguments for printing a file.
#[derive(Debug, Clone, Default, Args)]
pub struct PrintArgs {
    /// SVG or PNG file to print
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Printer device address (e.g. usb://0x04f9:0x2042)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Label-size code (e.g. 62x100, 29x90, 62)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Raster size as WIDTHxHEIGHT (defaults to the label's printable area)
    #[arg(short, long, value_name = "WxH")]
    pub size: Option<Dimensions>,

    /// Printer model passed to the driver (e.g. QL-700)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Fail when the printer driver exits non-zero instead of warning
    #[arg(long)]
    pub strict: bool,
}

impl PrintArgs {
    /// Whether a file or any print flag was given.
    #[must_use]
    pub fn is_given(&self) -> bool {
        self.input.is_some()
            || self.device.is_some()
            || self.label.is_some()
            || self.size.is_some()
            || self.model.is_some()
            || self.strict
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Label listing arguments.
#[derive(Debug, Args)]
pub struct LabelsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}
