//! Tests for argument parsing of ensure, check, digest.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;
use tdprov_core::config::RefreshStrategy;

#[test]
fn cli_parse_ensure_defaults() {
    match parse(&["tdprov", "ensure"]) {
        CliCommand::Ensure {
            location,
            source,
            strategy,
            verify,
        } => {
            assert!(location.dir.is_none());
            assert!(location.anchor.is_none());
            assert!(source.url.is_none());
            assert!(source.expected.is_none());
            assert!(strategy.is_none());
            assert!(!verify);
        }
        _ => panic!("expected Ensure"),
    }
}

#[test]
fn cli_parse_ensure_all_flags() {
    match parse(&[
        "tdprov",
        "ensure",
        "--anchor",
        "/repo/scripts",
        "--url",
        "https://data.example.org/t.zip",
        "--expected",
        "ab",
        "--strategy",
        "fetch-first",
        "--verify",
    ]) {
        CliCommand::Ensure {
            location,
            source,
            strategy,
            verify,
        } => {
            assert_eq!(location.anchor, Some(PathBuf::from("/repo/scripts")));
            assert_eq!(source.url.as_deref(), Some("https://data.example.org/t.zip"));
            assert_eq!(source.expected.as_deref(), Some("ab"));
            assert_eq!(strategy, Some(RefreshStrategy::FetchFirst));
            assert!(verify);
        }
        _ => panic!("expected Ensure"),
    }
}

#[test]
fn cli_parse_bad_strategy_rejected() {
    assert!(Cli::try_parse_from(["tdprov", "ensure", "--strategy", "swap"]).is_err());
}

#[test]
fn cli_parse_dir_conflicts_with_anchor() {
    assert!(Cli::try_parse_from(["tdprov", "check", "--dir", "a", "--anchor", "b"]).is_err());
}

#[test]
fn cli_parse_check_json() {
    match parse(&["tdprov", "check", "--dir", "/tmp/testdata", "--json"]) {
        CliCommand::Check { location, json, .. } => {
            assert_eq!(location.dir, Some(PathBuf::from("/tmp/testdata")));
            assert!(json);
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_digest_per_file() {
    match parse(&["tdprov", "digest", "--per-file"]) {
        CliCommand::Digest { per_file, .. } => assert!(per_file),
        _ => panic!("expected Digest"),
    }
}

#[test]
fn cli_parse_global_config_after_subcommand() {
    let cli = Cli::try_parse_from(["tdprov", "digest", "--config", "/etc/tdprov.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/etc/tdprov.toml")));
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["tdprov"]).is_err());
}
