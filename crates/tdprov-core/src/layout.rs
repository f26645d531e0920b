//! Where the test data lives.
//!
//! The directory is derived from an explicit anchor (the directory holding the
//! utility) rather than the process working directory:
//! `<anchor>/../testdata`.

use crate::config::TESTDATA_DIR_NAME;
use crate::error::ProvisionError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDataDir {
    path: PathBuf,
}

impl TestDataDir {
    /// `testdata` next to the anchor directory. An anchor without a parent
    /// (filesystem root) gets `testdata` inside it.
    pub fn from_anchor(anchor: &Path) -> Self {
        let base = anchor.parent().unwrap_or(anchor);
        TestDataDir {
            path: base.join(TESTDATA_DIR_NAME),
        }
    }

    /// Anchored on the directory containing the running executable.
    pub fn from_current_exe() -> Result<Self, ProvisionError> {
        let exe = std::env::current_exe()
            .map_err(|e| ProvisionError::fs("locate", Path::new("current executable"), e))?;
        let anchor = exe.parent().unwrap_or(exe.as_path());
        Ok(Self::from_anchor(anchor))
    }

    /// Use `path` as-is.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        TestDataDir { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the directory (and parents) if absent.
    pub fn ensure_exists(&self) -> Result<(), ProvisionError> {
        fs::create_dir_all(&self.path).map_err(|e| ProvisionError::fs("create", &self.path, e))
    }
}
