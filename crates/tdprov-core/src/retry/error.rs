//! Fetch error type for retry classification.

use std::fmt;

/// Error returned by a single archive GET (curl failure, HTTP error, or local write failure).
/// Kept separate from `ProvisionError` so retries can be decided on the raw cause.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, bad URL, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the body to disk failed. Not retried.
    Io(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(_) => write!(f, "curl transfer failed"),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Io(_) => write!(f, "could not write archive"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Io(e) => Some(e),
            FetchError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}
