//! The label print dispatcher.
//!
//! One dispatch takes one input file through a fixed sequence:
//!
//! ```text
//! validate input -> (convert, if vector) -> print -> clean up
//! ```
//!
//! Vector input is rasterized into a [`ScopedTempFile`] first; raster input
//! goes to the printer untouched and its pixel size is not checked. The
//! scratch file is removed on every path out of [`Dispatcher::dispatch`],
//! including when the dispatch future is dropped by [`Dispatcher::dispatch_until`].

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::{Config, DriverFailurePolicy};
use crate::error::{Error, Result};
use crate::labels::Dimensions;
use crate::scratch::ScopedTempFile;
use crate::tools::{
    BrotherQl, ConversionJob, ImageConverter, ImageMagick, PrintJob, PrinterDriver, ToolStatus,
};

/// File name suffix that marks an input as a vector image.
const VECTOR_SUFFIX: &[u8] = b".svg";

/// How an input file reaches the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Scalable image that has to be rasterized first.
    Vector,
    /// Image the driver can consume directly.
    Raster,
}

impl InputKind {
    /// Classify a path by a case-insensitive `.svg` suffix.
    ///
    /// Everything else is assumed to be a raster the driver understands.
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        let bytes = path.as_os_str().as_encoded_bytes();
        let is_vector = bytes.len() >= VECTOR_SUFFIX.len()
            && bytes[bytes.len() - VECTOR_SUFFIX.len()..].eq_ignore_ascii_case(VECTOR_SUFFIX);
        if is_vector {
            Self::Vector
        } else {
            Self::Raster
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Raster => write!(f, "raster"),
        }
    }
}

/// Everything needed to print one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    /// File given by the operator.
    pub input: PathBuf,
    /// Printer device address.
    pub device: String,
    /// Label-size code.
    pub label: String,
    /// Raster size the label needs.
    pub size: Dimensions,
}

impl PrintRequest {
    /// Build a request for `input` from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a usage error for an empty path, or a configuration error if no
    /// raster size can be determined.
    pub fn new(input: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let input = input.into();
        if input.as_os_str().is_empty() {
            return Err(Error::usage("input file path must not be empty"));
        }
        Ok(Self {
            input,
            device: config.printer.device.clone(),
            label: config.printer.label.clone(),
            size: config.dimensions()?,
        })
    }

    /// Classification of the input file.
    #[must_use]
    pub fn kind(&self) -> InputKind {
        InputKind::classify(&self.input)
    }
}

/// Result of a dispatch that reached the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// How the input was treated.
    pub kind: InputKind,
    /// What the printer driver reported.
    pub driver_status: ToolStatus,
}

impl DispatchOutcome {
    /// Whether the driver returned non-zero but the policy let it pass.
    #[must_use]
    pub fn is_advisory(&self) -> bool {
        !self.driver_status.success()
    }
}

/// Converts and prints label files.
#[derive(Debug)]
pub struct Dispatcher<C, D> {
    converter: C,
    driver: D,
    policy: DriverFailurePolicy,
    temp_dir: PathBuf,
}

impl Dispatcher<ImageMagick, BrotherQl> {
    /// Create a dispatcher using ImageMagick and `brother_ql` as configured.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ImageMagick::from_config(&config.raster),
            BrotherQl::from_config(&config.printer),
        )
        .with_policy(config.printer.on_failure)
        .with_temp_dir(config.temp_dir())
    }
}

impl<C, D> Dispatcher<C, D>
where
    C: ImageConverter,
    D: PrinterDriver,
{
    /// Create a dispatcher over the given collaborators.
    ///
    /// Scratch files go to the system temp directory and driver failures are
    /// only warned about until configured otherwise.
    #[must_use]
    pub fn new(converter: C, driver: D) -> Self {
        Self {
            converter,
            driver,
            policy: DriverFailurePolicy::default(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Set the policy for non-zero driver statuses.
    #[must_use]
    pub fn with_policy(mut self, policy: DriverFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the directory scratch rasters are created in.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// The converter in use.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// The printer driver in use.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Print one file, converting it first if it is a vector image.
    ///
    /// # Errors
    ///
    /// - [`Error::InputNotFound`] if the input is not a regular file. Nothing
    ///   is created or run in that case.
    /// - [`Error::Conversion`] if the converter exits non-zero. The printer
    ///   is not invoked.
    /// - [`Error::PrintFailed`] if the driver exits non-zero under
    ///   [`DriverFailurePolicy::Fail`].
    /// - [`Error::ToolSpawn`] / [`Error::TempFile`] for environment failures.
    pub async fn dispatch(&self, request: &PrintRequest) -> Result<DispatchOutcome> {
        ensure_regular_file(&request.input).await?;

        let kind = request.kind();
        info!(input = %request.input.display(), %kind, "Dispatching label");

        let scratch = match kind {
            InputKind::Vector => Some(self.rasterize(request).await?),
            InputKind::Raster => None,
        };
        let file = scratch
            .as_ref()
            .map_or(request.input.as_path(), ScopedTempFile::path)
            .to_path_buf();

        let printed = self
            .driver
            .print(PrintJob {
                device: &request.device,
                label: &request.label,
                file: &file,
            })
            .await;

        if let Some(scratch) = scratch {
            discard(scratch);
        }

        let driver_status = printed?;
        if driver_status.success() {
            info!(file = %file.display(), "Label sent to printer");
        } else {
            match self.policy {
                DriverFailurePolicy::Warn => {
                    warn!(
                        driver = self.driver.name(),
                        %driver_status,
                        "Printer driver reported a problem; the label was probably printed anyway"
                    );
                }
                DriverFailurePolicy::Fail => {
                    error!(driver = self.driver.name(), %driver_status, "Printing failed");
                    return Err(Error::PrintFailed {
                        path: request.input.clone(),
                        status: driver_status,
                    });
                }
            }
        }

        Ok(DispatchOutcome {
            kind,
            driver_status,
        })
    }

    /// Like [`dispatch`](Self::dispatch), but give up when `shutdown` completes.
    ///
    /// Abandoning the dispatch drops its scratch file and kills any running
    /// tool before [`Error::Interrupted`] is returned.
    ///
    /// # Errors
    ///
    /// Everything [`dispatch`](Self::dispatch) returns, plus
    /// [`Error::Interrupted`].
    pub async fn dispatch_until<F>(
        &self,
        request: &PrintRequest,
        shutdown: F,
    ) -> Result<DispatchOutcome>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = shutdown => {
                warn!("Interrupted; abandoning print job");
                Err(Error::Interrupted)
            }
            result = self.dispatch(request) => result,
        }
    }

    async fn rasterize(&self, request: &PrintRequest) -> Result<ScopedTempFile> {
        let scratch = ScopedTempFile::create_in(&self.temp_dir)?;
        debug!(
            converter = self.converter.name(),
            size = %request.size,
            output = %scratch.path().display(),
            "Rasterizing vector label"
        );

        let status = self
            .converter
            .convert(ConversionJob {
                input: &request.input,
                output: scratch.path(),
                size: request.size,
            })
            .await?;

        if !status.success() {
            error!(converter = self.converter.name(), %status, "Image conversion failed");
            discard(scratch);
            return Err(Error::Conversion {
                input: request.input.clone(),
                status,
            });
        }
        Ok(scratch)
    }
}

/// Remove a scratch file, logging rather than failing if that goes wrong.
fn discard(scratch: ScopedTempFile) {
    if let Err(e) = scratch.release() {
        warn!("{e}");
    }
}

async fn ensure_regular_file(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(Error::InputNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::InputNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Resolve when the process receives Ctrl+C or, on Unix, SIGTERM.
///
/// If a handler cannot be installed that signal is simply never observed.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
