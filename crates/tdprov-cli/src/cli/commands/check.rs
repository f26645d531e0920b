//! `tdprov check` – read-only verification.

use anyhow::{bail, Result};
use tdprov_core::config::ProvisionConfig;
use tdprov_core::{Provisioner, TestDataDir};

pub fn run_check(cfg: ProvisionConfig, dir: &TestDataDir, json: bool) -> Result<()> {
    let report = Provisioner::from_config(cfg).check(dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("directory: {}", report.directory.display());
        println!("files:     {}", report.files.len());
        println!("observed:  {}", report.observed_digest);
        println!("expected:  {}", report.expected_digest);
    }
    if !report.valid {
        bail!("test data in {} does not match the expected digest", report.directory.display());
    }
    if !json {
        println!("test data OK");
    }
    Ok(())
}
