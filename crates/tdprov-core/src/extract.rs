//! Zip extraction into the test-data directory.
//!
//! Existing files are overwritten. Entry names are checked with
//! `enclosed_name` so nothing lands outside the destination.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub trait ArchiveExtractor {
    /// Extract `archive_path` into `dest_dir`, returning the files written
    /// (relative to `dest_dir`, in archive order).
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Not a zip, truncated, or a corrupt entry.
    #[error("malformed archive")]
    Zip(#[from] zip::result::ZipError),

    #[error("extraction I/O error")]
    Io(#[from] io::Error),

    /// Absolute path or `..` in an entry name.
    #[error("unsafe path in archive: {name}")]
    UnsafePath { name: String },

    /// The archive holds no regular files.
    #[error("archive contains no files")]
    EmptyArchive,
}

pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut extracted = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let rel_path = entry
                .enclosed_name()
                .ok_or_else(|| ExtractionError::UnsafePath {
                    name: entry.name().to_string(),
                })?;
            let outpath = dest_dir.join(&rel_path);

            if entry.is_dir() {
                fs::create_dir_all(&outpath)?;
                continue;
            }
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
            tracing::debug!(file = %rel_path.display(), size = entry.size(), "extracted");
            extracted.push(rel_path);
        }

        if extracted.is_empty() {
            return Err(ExtractionError::EmptyArchive);
        }
        Ok(extracted)
    }
}
