//! CLI for the tdprov test-data provisioner.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tdprov_core::config::{self, ProvisionConfig, RefreshStrategy};
use tdprov_core::TestDataDir;

use commands::{run_check, run_digest, run_ensure};

/// Top-level CLI for tdprov.
#[derive(Debug, Parser)]
#[command(name = "tdprov")]
#[command(about = "tdprov: verify and fetch the known-good test-data set", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/tdprov/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where the test-data directory is.
#[derive(Debug, Clone, Default, Args)]
pub struct Location {
    /// Use this directory as-is.
    #[arg(long, value_name = "DIR", conflicts_with = "anchor")]
    pub dir: Option<PathBuf>,
    /// Resolve `<ANCHOR>/../testdata` (default: directory of the tdprov executable).
    #[arg(long, value_name = "ANCHOR")]
    pub anchor: Option<PathBuf>,
}

impl Location {
    pub fn resolve(&self) -> Result<TestDataDir> {
        Ok(match (&self.dir, &self.anchor) {
            (Some(dir), _) => TestDataDir::at(dir),
            (None, Some(anchor)) => TestDataDir::from_anchor(anchor),
            (None, None) => TestDataDir::from_current_exe()?,
        })
    }
}

/// Overrides for the archive source and expected digest.
#[derive(Debug, Clone, Default, Args)]
pub struct Source {
    /// Archive URL (overrides config).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
    /// Expected combined SHA-256, hex (overrides config).
    #[arg(long, value_name = "HEX")]
    pub expected: Option<String>,
}

impl Source {
    pub fn apply(&self, cfg: &mut ProvisionConfig) {
        if let Some(url) = &self.url {
            cfg.archive_url = url.clone();
        }
        if let Some(expected) = &self.expected {
            cfg.expected_digest = expected.clone();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Verify the test data and download it again if the digest does not match.
    Ensure {
        #[command(flatten)]
        location: Location,
        #[command(flatten)]
        source: Source,
        /// delete-first (default) or fetch-first.
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<RefreshStrategy>,
        /// Re-hash after extraction and fail if the digest still does not match.
        #[arg(long)]
        verify: bool,
    },

    /// Report whether the test data matches, without changing anything. Exits 1 on mismatch.
    Check {
        #[command(flatten)]
        location: Location,
        #[command(flatten)]
        source: Source,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the combined digest of the candidate files (e.g. to update the expected value).
    Digest {
        #[command(flatten)]
        location: Location,
        /// Also print each file's own SHA-256.
        #[arg(long)]
        per_file: bool,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Ensure {
                location,
                source,
                strategy,
                verify,
            } => {
                let mut cfg = cfg;
                source.apply(&mut cfg);
                if let Some(strategy) = strategy {
                    cfg.strategy = strategy;
                }
                cfg.verify_after_extract |= verify;
                run_ensure(cfg.validated()?, &location.resolve()?, &mut io::stdout())?;
            }
            CliCommand::Check {
                location,
                source,
                json,
            } => {
                let mut cfg = cfg;
                source.apply(&mut cfg);
                run_check(cfg.validated()?, &location.resolve()?, json)?;
            }
            CliCommand::Digest { location, per_file } => {
                run_digest(&cfg, &location.resolve()?, per_file, &mut io::stdout())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
