//! The provisioner: verify the candidate set against the expected digest and,
//! on mismatch, replace it with the contents of the remote archive.
//!
//! Sequence on mismatch with the default `DeleteFirst` strategy:
//! delete candidates, fetch archive into the directory, extract, delete archive.
//! A failed fetch therefore leaves the directory without candidates.
//! `FetchFirst` stages the archive in a temporary directory and only touches
//! the candidates once the download succeeded.

use crate::candidates::CandidateSet;
use crate::config::{ProvisionConfig, RefreshStrategy};
use crate::error::ProvisionError;
use crate::extract::{ArchiveExtractor, ZipExtractor};
use crate::fetch::{archive_file_name, ArchiveFetcher, CurlFetcher};
use crate::layout::TestDataDir;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What `ensure` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Digest matched; nothing was touched.
    AlreadyValid { digest: String },
    /// Digest did not match; candidates were replaced from the archive.
    Refreshed {
        observed: String,
        removed: usize,
        extracted: Vec<PathBuf>,
    },
}

/// Read-only view of the directory, as produced by `check`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
    pub observed_digest: String,
    pub expected_digest: String,
    pub valid: bool,
}

pub struct Provisioner<F, X> {
    config: ProvisionConfig,
    fetcher: F,
    extractor: X,
}

impl Provisioner<CurlFetcher, ZipExtractor> {
    /// libcurl fetcher and zip extractor configured from `config`.
    pub fn from_config(config: ProvisionConfig) -> Self {
        let fetcher = CurlFetcher::from_config(&config);
        Provisioner::new(config, fetcher, ZipExtractor)
    }
}

impl<F: ArchiveFetcher, X: ArchiveExtractor> Provisioner<F, X> {
    pub fn new(config: ProvisionConfig, fetcher: F, extractor: X) -> Self {
        Provisioner {
            config,
            fetcher,
            extractor,
        }
    }

    /// Hash the current candidates without modifying anything.
    /// A missing directory reads as an empty candidate set.
    pub fn check(&self, dir: &TestDataDir) -> Result<Report, ProvisionError> {
        let candidates = if dir.path().is_dir() {
            CandidateSet::scan(dir.path(), &self.config.extensions)?
        } else {
            CandidateSet::default()
        };
        let observed = candidates.digest()?;
        Ok(Report {
            directory: dir.path().to_path_buf(),
            files: candidates.files().to_vec(),
            valid: observed == self.config.expected_digest,
            observed_digest: observed,
            expected_digest: self.config.expected_digest.clone(),
        })
    }

    /// Make `dir` hold the known-good candidate set.
    pub fn ensure(&self, dir: &TestDataDir) -> Result<Outcome, ProvisionError> {
        self.ensure_with(dir, |_| {})
    }

    /// Like `ensure`, but calls `on_mismatch` with the observed digest after
    /// the comparison fails and before any candidate is touched.
    pub fn ensure_with(
        &self,
        dir: &TestDataDir,
        on_mismatch: impl FnOnce(&str),
    ) -> Result<Outcome, ProvisionError> {
        dir.ensure_exists()?;
        let candidates = CandidateSet::scan(dir.path(), &self.config.extensions)?;
        let observed = candidates.digest()?;

        if observed == self.config.expected_digest {
            tracing::info!(dir = %dir.path().display(), files = candidates.len(), "test data OK, skipping download");
            return Ok(Outcome::AlreadyValid { digest: observed });
        }
        tracing::warn!(
            dir = %dir.path().display(),
            expected = %self.config.expected_digest,
            "hash mismatch (got {}), redownloading",
            observed
        );
        on_mismatch(&observed);

        let (removed, extracted) = match self.config.strategy {
            RefreshStrategy::DeleteFirst => self.refresh_delete_first(dir.path(), &candidates)?,
            RefreshStrategy::FetchFirst => self.refresh_fetch_first(dir.path(), &candidates)?,
        };

        if self.config.verify_after_extract {
            let actual = CandidateSet::scan(dir.path(), &self.config.extensions)?.digest()?;
            if actual != self.config.expected_digest {
                return Err(ProvisionError::DigestMismatch {
                    expected: self.config.expected_digest.clone(),
                    actual,
                });
            }
            tracing::debug!("post-extraction digest verified");
        }

        tracing::info!(removed, extracted = extracted.len(), "test data refreshed");
        Ok(Outcome::Refreshed {
            observed,
            removed,
            extracted,
        })
    }

    fn refresh_delete_first(
        &self,
        dir: &Path,
        candidates: &CandidateSet,
    ) -> Result<(usize, Vec<PathBuf>), ProvisionError> {
        let removed = candidates.remove_all()?;
        let archive = dir.join(archive_file_name(&self.config.archive_url));
        self.download(&archive)?;
        let extracted = self.unpack(&archive, dir)?;
        Ok((removed, extracted))
    }

    fn refresh_fetch_first(
        &self,
        dir: &Path,
        candidates: &CandidateSet,
    ) -> Result<(usize, Vec<PathBuf>), ProvisionError> {
        let staging = tempfile::Builder::new()
            .prefix(".tdprov-staging-")
            .tempdir_in(dir)
            .map_err(|e| ProvisionError::fs("create staging directory in", dir, e))?;
        let archive = staging
            .path()
            .join(archive_file_name(&self.config.archive_url));
        self.download(&archive)?;

        let removed = candidates.remove_all()?;
        let extracted = self.unpack(&archive, dir)?;
        let staging_path = staging.path().to_path_buf();
        staging
            .close()
            .map_err(|e| ProvisionError::fs("remove", &staging_path, e))?;
        Ok((removed, extracted))
    }

    fn download(&self, archive: &Path) -> Result<(), ProvisionError> {
        tracing::info!(url = %self.config.archive_url, dest = %archive.display(), "fetching archive");
        match self.fetcher.fetch(&self.config.archive_url, archive) {
            Ok(bytes) => {
                tracing::debug!(bytes, "archive downloaded");
                Ok(())
            }
            Err(e) => {
                discard_partial(archive);
                Err(ProvisionError::Network(e))
            }
        }
    }

    /// Extract, then delete the archive. On failure the archive stays where it
    /// was downloaded; under `FetchFirst` that is the staging directory, which
    /// is removed when it goes out of scope.
    fn unpack(&self, archive: &Path, dir: &Path) -> Result<Vec<PathBuf>, ProvisionError> {
        let extracted = self.extractor.extract(archive, dir)?;
        fs::remove_file(archive).map_err(|e| ProvisionError::fs("remove", archive, e))?;
        Ok(extracted)
    }
}

fn discard_partial(archive: &Path) {
    match fs::remove_file(archive) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %archive.display(), error = %e, "could not remove partial archive"),
    }
}

/// `ensure` with the libcurl fetcher and zip extractor.
pub fn ensure_test_data(
    dir: &TestDataDir,
    config: &ProvisionConfig,
) -> Result<Outcome, ProvisionError> {
    Provisioner::from_config(config.clone()).ensure(dir)
}
