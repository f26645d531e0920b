//! `tdprov digest` – print the combined SHA-256 of the candidate files.

use anyhow::Result;
use std::io::Write;
use tdprov_core::candidates::CandidateSet;
use tdprov_core::checksum;
use tdprov_core::config::{self, ProvisionConfig};
use tdprov_core::TestDataDir;

/// Only `extensions` is read from `cfg`; the source settings are not validated.
pub fn run_digest(
    cfg: &ProvisionConfig,
    dir: &TestDataDir,
    per_file: bool,
    out: &mut impl Write,
) -> Result<String> {
    let extensions = config::normalize_extensions(&cfg.extensions)?;
    let set = CandidateSet::scan(dir.path(), &extensions)?;
    if per_file {
        for path in set.files() {
            writeln!(out, "{}  {}", checksum::sha256_path(path)?, path.display())?;
        }
    }
    let digest = set.digest()?;
    writeln!(out, "{}  ({} files)", digest, set.len())?;
    Ok(digest)
}
