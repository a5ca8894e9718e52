//! Scoped scratch files.
//!
//! A [`ScopedTempFile`] is the intermediate raster produced when a vector
//! label has to be converted before printing. It is owned by exactly one
//! dispatch and the file is removed when the guard is dropped, so every exit
//! path cleans up: early returns, `?` propagation, panics and the dispatch
//! future being dropped on interrupt.

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Name prefix of scratch files, so stray files are easy to attribute.
pub const SCRATCH_PREFIX: &str = "labelprint-";

/// Suffix of scratch files. The converter picks its output format from it.
pub const SCRATCH_SUFFIX: &str = ".png";

/// A uniquely named file that is deleted when this guard goes out of scope.
#[derive(Debug)]
pub struct ScopedTempFile {
    path: TempPath,
}

impl ScopedTempFile {
    /// Create a new empty scratch file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let file = Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(SCRATCH_SUFFIX)
            .tempfile_in(dir)
            .map_err(|source| Error::TempFile {
                dir: dir.to_path_buf(),
                source,
            })?;
        // Only the path is kept; the converter writes the file by name.
        let path = file.into_temp_path();
        debug!("Created scratch file {}", path.display());
        Ok(Self { path })
    }

    /// Path of the scratch file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, reporting any failure.
    ///
    /// Dropping the guard also deletes the file but has to swallow errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists and cannot be removed.
    pub fn release(self) -> Result<()> {
        let path: PathBuf = self.path.to_path_buf();
        let dir = path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        match self.path.close() {
            Ok(()) => {
                debug!("Removed scratch file {}", path.display());
                Ok(())
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => {
                warn!("Failed to remove scratch file {}: {source}", path.display());
                Err(Error::TempFile { dir, source })
            }
        }
    }
}
