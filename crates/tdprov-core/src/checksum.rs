//! SHA-256 digests: per file, and combined over an ordered list of files.
//!
//! The combined digest is the hash of the files' bytes concatenated in the
//! order given, streamed through one hasher so nothing is held in memory.

use crate::error::ProvisionError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String, ProvisionError> {
    let mut hasher = Sha256::new();
    feed(&mut hasher, path)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA-256 over the concatenation of `paths`, in order, as lowercase hex.
/// An empty list yields the digest of the empty input.
pub fn combined_digest<P: AsRef<Path>>(paths: &[P]) -> Result<String, ProvisionError> {
    let mut hasher = Sha256::new();
    for p in paths {
        feed(&mut hasher, p.as_ref())?;
    }
    Ok(hex::encode(hasher.finalize()))
}

fn feed(hasher: &mut Sha256, path: &Path) -> Result<(), ProvisionError> {
    let mut f = File::open(path).map_err(|e| ProvisionError::fs("open", path, e))?;
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .map_err(|e| ProvisionError::fs("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}
