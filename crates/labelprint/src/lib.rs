//! `labelprint` - Print SVG and PNG labels on Brother QL printers
//!
//! This library provides the label print dispatcher: it classifies an input
//! file, rasterizes vector labels to the exact pixel size the loaded label
//! needs, and hands the result to the `brother_ql` driver.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod labels;
pub mod logging;
pub mod scratch;
pub mod tools;

pub use config::{Config, DriverFailurePolicy, Overrides};
pub use dispatch::{shutdown_signal, DispatchOutcome, Dispatcher, InputKind, PrintRequest};
pub use error::{Error, Result};
pub use labels::{Dimensions, LabelSpec};
pub use logging::init_logging;
pub use scratch::ScopedTempFile;
