//! Error taxonomy for provisioning.
//!
//! Every failure aborts the run; nothing here is recovered locally. The CLI
//! turns any of these into a non-zero exit.

use crate::extract::ExtractionError;
use crate::retry::FetchError;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Creating, reading or deleting something in the test-data directory failed.
    #[error("failed to {action} {}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive GET failed (connection, timeout, non-2xx, or writing the body).
    #[error("archive download failed")]
    Network(#[from] FetchError),

    /// The downloaded archive could not be unpacked.
    #[error("archive extraction failed")]
    Extraction(#[from] ExtractionError),

    /// Only raised when post-extraction verification is enabled.
    #[error("digest mismatch after extraction: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProvisionError {
    pub(crate) fn fs(action: &'static str, path: &Path, source: io::Error) -> Self {
        ProvisionError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}
