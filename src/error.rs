//! Error taxonomy for diskbench-rs
//!
//! Fallible call sites return `crate::Result<T>` (an alias for `anyhow::Result<T>`).
//! `DiskBenchError` covers the handful of conditions the core itself raises;
//! everything else is propagated with `.context(...)` from the underlying
//! `std::io::Error` / `libc` errno.

use thiserror::Error;

/// Errors raised directly by the benchmarking core.
///
/// Argument parsing errors are surfaced as plain `anyhow::Error` from the CLI
/// layer (`clap` already produces good messages); this enum is reserved for
/// conditions the core detects at runtime.
#[derive(Debug, Error)]
pub enum DiskBenchError {
    /// The data read back from disk did not match what was written.
    #[error("data integrity violation at offset {offset}: expected pattern not found")]
    IntegrityViolation { offset: u64 },

    /// A platform adapter call (open/truncate/queue create/submit/reap) failed.
    #[error("adapter failure: {0}")]
    AdapterFailure(String),

    /// A queue operation was attempted with no free slots available.
    #[error("queue depth exhausted: no free slots")]
    QueueDepthExhausted,
}
