//! Candidate file set: the files in the test-data directory whose extension
//! is one of the configured data-file kinds.
//!
//! Only the top level of the directory is scanned. Matching is on the exact
//! (case-sensitive) extension. Files are ordered by file name so the combined
//! digest does not depend on the filesystem's enumeration order.

use crate::checksum;
use crate::error::ProvisionError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    files: Vec<PathBuf>,
}

impl CandidateSet {
    /// Lists candidate files in `dir`, sorted by file name.
    pub fn scan(dir: &Path, extensions: &[String]) -> Result<Self, ProvisionError> {
        let entries = fs::read_dir(dir).map_err(|e| ProvisionError::fs("read directory", dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ProvisionError::fs("read directory", dir, e))?;
            let path = entry.path();
            if path.is_file() && has_candidate_extension(&path, extensions) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(CandidateSet { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Combined SHA-256 over all candidates in order.
    pub fn digest(&self) -> Result<String, ProvisionError> {
        checksum::combined_digest(&self.files)
    }

    /// Deletes every candidate file. Returns how many were removed.
    /// A file that vanished in the meantime is not an error.
    pub fn remove_all(&self) -> Result<usize, ProvisionError> {
        let mut removed = 0;
        for f in &self.files {
            match fs::remove_file(f) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ProvisionError::fs("remove", f, e)),
            }
        }
        tracing::debug!(removed, "removed candidate files");
        Ok(removed)
    }
}

/// True if `path` ends in `.<ext>` for one of `extensions`.
pub fn has_candidate_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|want| want == ext),
        None => false,
    }
}
