//! ImageMagick converter.

use std::ffi::OsString;

use async_trait::async_trait;

use super::{run_tool, ConversionJob, ImageConverter, ToolStatus};
use crate::config::RasterConfig;
use crate::error::Result;

/// Rasterizes labels with ImageMagick's `convert` (or `magick`).
///
/// The image is scaled to fit inside the target size, centred on a filled
/// canvas and then extended or cropped to exactly that size, so the output
/// pixel count never depends on the source's aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMagick {
    program: String,
    background: String,
    density: Option<u32>,
}

impl ImageMagick {
    /// Create a converter running `program` with a given canvas fill.
    #[must_use]
    pub fn new(program: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            background: background.into(),
            density: None,
        }
    }

    /// Create a converter from the `[raster]` configuration section.
    #[must_use]
    pub fn from_config(config: &RasterConfig) -> Self {
        Self::new(&config.program, &config.background).with_density(config.density)
    }

    /// Set the rasterization density in dpi.
    #[must_use]
    pub fn with_density(mut self, density: Option<u32>) -> Self {
        self.density = density;
        self
    }

    /// Build the argument list for one conversion.
    ///
    /// Options that affect how the SVG is read (`-density`, `-background`)
    /// must precede the input file.
    #[must_use]
    pub fn args(&self, job: &ConversionJob<'_>) -> Vec<OsString> {
        let size = job.size.to_string();
        let mut args: Vec<OsString> = Vec::with_capacity(12);
        if let Some(density) = self.density {
            args.push("-density".into());
            args.push(density.to_string().into());
        }
        args.push("-background".into());
        args.push(self.background.as_str().into());
        args.push(job.input.into());
        args.push("-resize".into());
        args.push(size.as_str().into());
        args.push("-gravity".into());
        args.push("center".into());
        args.push("-extent".into());
        args.push(size.into());
        args.push(job.output.into());
        args
    }
}

#[async_trait]
impl ImageConverter for ImageMagick {
    fn name(&self) -> &str {
        &self.program
    }

    async fn convert(&self, job: ConversionJob<'_>) -> Result<ToolStatus> {
        run_tool(&self.program, self.args(&job)).await
    }
}
