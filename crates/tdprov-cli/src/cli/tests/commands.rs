//! Command handlers against a scratch directory (no network).

use crate::cli::commands::{run_check, run_digest, run_ensure};
use crate::cli::{Location, Source};
use std::fs;
use std::net::TcpListener;
use tdprov_core::candidates::CandidateSet;
use tdprov_core::config::{default_extensions, ProvisionConfig, RetryConfig};
use tdprov_core::TestDataDir;

const GOLDEN: &str = "87d83f78b13f6e63541204e7900058caccbc762b513998a5b6d59f79e27bd6b2";

fn write_fixture(dir: &std::path::Path) {
    fs::write(dir.join("D20250530T000150_IFCB225.adc"), b"1,0.5,0.25\n").unwrap();
    fs::write(dir.join("D20250530T000150_IFCB225.hdr"), b"sampleNumber: 1\n").unwrap();
    fs::write(dir.join("D20250530T000150_IFCB225.roi"), b"ROI\n").unwrap();
    fs::write(dir.join("D20250530T000150_IFCB225.tsv"), b"trigger\troi_x\n1\t0\n").unwrap();
}

fn config() -> ProvisionConfig {
    let mut cfg = ProvisionConfig::default();
    Source {
        url: Some("https://data.example.org/testdata.zip".into()),
        expected: Some(GOLDEN.to_uppercase()),
    }
    .apply(&mut cfg);
    cfg.validated().unwrap()
}

#[test]
fn source_overrides_config() {
    let cfg = config();
    assert_eq!(cfg.archive_url, "https://data.example.org/testdata.zip");
    assert_eq!(cfg.expected_digest, GOLDEN);
}

#[test]
fn location_prefers_dir_then_anchor() {
    let loc = Location {
        dir: Some("/x/testdata".into()),
        anchor: None,
    };
    assert_eq!(loc.resolve().unwrap().path(), std::path::Path::new("/x/testdata"));

    let loc = Location {
        dir: None,
        anchor: Some("/repo/scripts".into()),
    };
    assert_eq!(loc.resolve().unwrap().path(), std::path::Path::new("/repo/testdata"));
}

#[test]
fn check_passes_on_matching_fixture() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path());
    run_check(config(), &TestDataDir::at(tmp.path()), false).unwrap();
    run_check(config(), &TestDataDir::at(tmp.path()), true).unwrap();
}

#[test]
fn check_fails_on_mismatch_without_touching_files() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path());
    fs::write(tmp.path().join("extra.roi"), b"x").unwrap();
    assert!(run_check(config(), &TestDataDir::at(tmp.path()), false).is_err());
    assert!(tmp.path().join("extra.roi").exists());
}

/// A local URL nothing listens on.
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/testdata.zip")
}

#[test]
fn digest_lists_fixture() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path());
    let mut out: Vec<u8> = Vec::new();

    let digest = run_digest(&config(), &TestDataDir::at(tmp.path()), true, &mut out).unwrap();

    assert_eq!(digest, GOLDEN);
    let out = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("D20250530T000150_IFCB225.adc"));
    assert_eq!(lines[4], format!("{GOLDEN}  (4 files)"));
}

#[test]
fn digest_ignores_unrelated_config_errors() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path());
    let cfg = ProvisionConfig {
        archive_url: "ftp://nowhere".into(),
        expected_digest: "not hex".into(),
        extensions: vec![".adc".into(), "hdr".into(), "roi".into(), "tsv".into()],
        timeout_secs: 0,
        ..ProvisionConfig::default()
    };
    assert!(cfg.clone().validated().is_err());

    let digest = run_digest(&cfg, &TestDataDir::at(tmp.path()), false, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(digest, GOLDEN);
}

#[test]
fn ensure_reports_valid_directory() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture(tmp.path());
    let mut cfg = config();
    cfg.archive_url = refused_url();
    let mut out: Vec<u8> = Vec::new();

    run_ensure(cfg, &TestDataDir::at(tmp.path()), &mut out).unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("test data OK, skipping download"));
}

#[test]
fn ensure_reports_mismatch_even_when_download_fails() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("D20250530T000150_IFCB225.adc"), b"stale").unwrap();
    let stale = CandidateSet::scan(tmp.path(), &default_extensions())
        .unwrap()
        .digest()
        .unwrap();
    let mut cfg = config();
    cfg.archive_url = refused_url();
    cfg.connect_timeout_secs = 5;
    cfg.retry = Some(RetryConfig {
        max_attempts: 1,
        base_delay_secs: 0.0,
        max_delay_secs: 0,
    });
    let mut out: Vec<u8> = Vec::new();

    let err = run_ensure(cfg.validated().unwrap(), &TestDataDir::at(tmp.path()), &mut out)
        .unwrap_err();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("hash mismatch (got {stale}), redownloading\n")
    );
    assert!(format!("{err:#}").contains("archive download failed"));
    assert!(!tmp.path().join("D20250530T000150_IFCB225.adc").exists());
}
