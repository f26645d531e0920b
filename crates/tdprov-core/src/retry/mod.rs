//! Retry and backoff policy for the archive GET.
//!
//! Error classification (timeouts, throttling, connection failures) and
//! capped exponential backoff. The provisioner runs with a bounded number of
//! attempts; there is no way to configure an unbounded loop.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy, MAX_ATTEMPTS_CAP};
pub use run::run_with_retry;
