//! `tdprov ensure` – verify, and redownload on mismatch.

use anyhow::Result;
use std::io::Write;
use tdprov_core::config::ProvisionConfig;
use tdprov_core::{Outcome, Provisioner, TestDataDir};

/// The mismatch line goes out before any candidate is deleted, so it is
/// visible even when the refresh fails.
pub fn run_ensure(cfg: ProvisionConfig, dir: &TestDataDir, out: &mut impl Write) -> Result<()> {
    let provisioner = Provisioner::from_config(cfg);
    let mut announced = Ok(());
    let outcome = provisioner.ensure_with(dir, |observed| {
        announced = writeln!(out, "hash mismatch (got {observed}), redownloading")
            .and_then(|()| out.flush());
    });
    announced?;

    match outcome? {
        Outcome::AlreadyValid { .. } => {
            writeln!(out, "test data OK, skipping download ({})", dir.path().display())?;
        }
        Outcome::Refreshed {
            removed, extracted, ..
        } => {
            writeln!(
                out,
                "{}: removed {}, extracted {}",
                dir.path().display(),
                removed,
                extracted.len()
            )?;
        }
    }
    Ok(())
}
