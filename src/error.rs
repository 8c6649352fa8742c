//! Error types for the provisioning pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Every way a provisioning run can fail.
///
/// Only [`ProvisionError::ScriptWriteFailed`] is recoverable: by the time the
/// launch script is written the server has already been launched and verified.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The release manifest could not be fetched or parsed.
    #[error("Release catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Per-version metadata could not be fetched, or lacks a server artifact.
    #[error("Version metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The artifact could not be fetched or written to disk.
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// Both the tuned and the minimal launch failed.
    #[error("Server failed to launch with tuned and minimal flags: {0}")]
    LaunchFatal(String),

    /// The server did not produce its license file on first launch.
    #[error("License file not found at {}", .0.display())]
    LicenseFileMissing(PathBuf),

    /// The license file has no line at the acceptance position.
    #[error("License file {} has {lines} line(s), expected acceptance on line {}", .path.display(), .index + 1)]
    LicenseFileMalformed {
        path: PathBuf,
        lines: usize,
        index: usize,
    },

    /// The license file was read but could not be written back.
    #[error("Could not rewrite license file {}: {source}", .path.display())]
    LicenseWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The launch script could not be written.
    #[error("Could not write launch script {}: {source}", .path.display())]
    ScriptWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    /// Whether the run must stop after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ScriptWriteFailed { .. })
    }
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
