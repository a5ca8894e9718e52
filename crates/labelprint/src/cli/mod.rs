//! Command-line interface for labelprint.
//!
//! This module provides the CLI structure for the `labelprint` binary. The
//! common case takes no subcommand at all: `labelprint label.svg`.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;
use crate::error::{Error, Result};
use crate::logging::Verbosity;

pub use commands::{ConfigCommand, LabelsCommand, PrintArgs};

/// labelprint - Print SVG and PNG labels on a Brother QL printer
///
/// SVG files are rasterized to the exact pixel size of the loaded label
/// before printing; PNG files are sent as they are.
#[derive(Debug, Parser)]
#[command(name = "labelprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// What to print and how
    #[command(flatten)]
    pub print: PrintArgs,

    /// Auxiliary commands
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Auxiliary commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// List label codes known to the printer driver
    Labels(LabelsCommand),
}

impl Command {
    /// Name as typed on the command line.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Labels(_) => "labels",
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// Reject a file or print flags given together with a subcommand.
    ///
    /// # Errors
    ///
    /// Returns a usage error naming the subcommand.
    pub fn check_print_args(&self) -> Result<()> {
        match &self.command {
            Some(command) if self.print.is_given() => Err(Error::usage(format!(
                "FILE and print options cannot be used with the '{}' command",
                command.name()
            ))),
            _ => Ok(()),
        }
    }

    /// Configuration values given as flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            device: self.print.device.clone(),
            label: self.print.label.clone(),
            size: self.print.size,
            model: self.print.model.clone(),
            strict: self.print.strict,
        }
    }
}
