//! CLI command handlers, one per file.

mod check;
mod digest;
mod ensure;

pub use check::run_check;
pub use digest::run_digest;
pub use ensure::run_ensure;
