//! Verify a directory of test-data files against a known combined SHA-256
//! and, when it does not match, replace the files from a remote zip archive.

pub mod candidates;
pub mod checksum;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod layout;
pub mod logging;
pub mod provision;
pub mod retry;

pub use error::ProvisionError;
pub use layout::TestDataDir;
pub use provision::{ensure_test_data, Outcome, Provisioner, Report};
