//! Archive download: one HTTP(S) GET streamed to a file.
//!
//! Uses the curl crate (libcurl). Follows redirects. The transfer is retried
//! only for transient failures and only within the configured attempt budget;
//! each attempt truncates the destination file and starts over.

use crate::config::ProvisionConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Archive filename used when the URL path has no usable last segment.
pub const DEFAULT_ARCHIVE_NAME: &str = "testdata.zip";

pub trait ArchiveFetcher {
    /// Download `url` into `dest`, returning the number of body bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// libcurl settings for the archive GET.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer timeout.
    pub timeout: Duration,
    pub max_redirections: u32,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            max_redirections: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CurlFetcher {
    pub options: CurlOptions,
    pub policy: RetryPolicy,
}

impl CurlFetcher {
    pub fn from_config(cfg: &ProvisionConfig) -> Self {
        CurlFetcher {
            options: CurlOptions {
                connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
                timeout: Duration::from_secs(cfg.timeout_secs),
                ..CurlOptions::default()
            },
            policy: cfg.retry_policy(),
        }
    }
}

impl ArchiveFetcher for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        run_with_retry(&self.policy, || get_to_file(url, dest, self.options))
    }
}

/// Single GET of `url` into `dest` (created or truncated).
fn get_to_file(url: &str, dest: &Path, opts: CurlOptions) -> Result<u64, FetchError> {
    let mut file = File::create(dest)?;
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(FetchError::Io(e));
    }
    performed?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    file.sync_all()?;
    tracing::debug!(url, bytes = written, "archive fetched");
    Ok(written)
}

/// Local filename for the archive: last URL path segment, or `DEFAULT_ARCHIVE_NAME`.
pub fn archive_file_name(url: &str) -> String {
    let segment = url::Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut segs| segs.rfind(|s| !s.is_empty()).map(str::to_string))
    });
    match segment {
        Some(s) if s != "." && s != ".." && !s.contains('\\') => s,
        _ => DEFAULT_ARCHIVE_NAME.to_string(),
    }
}
