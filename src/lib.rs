//! diskbench-rs - direct-IO disk bandwidth, IOPS and latency benchmarking tool
//!
//! diskbench-rs drives one or more target files with a fixed-depth async IO
//! queue, sweeping request size and queue depth to find the point where
//! throughput stops improving, while continuously verifying that data read
//! back matches what was written.
//!
//! # Architecture
//!
//! - **Platform adapters**: a small tagged set of IO backends (`SyncAdapter`,
//!   `IoUringAdapter`) rather than a generic plugin interface.
//! - **Workload generators**: sequential, uniform-random and a fixed 75/25
//!   mixed generator, each producing one [`workload::Request`] at a time.
//! - **Sweep driver**: nested request-size x queue-depth loop with adaptive
//!   early termination once throughput stops improving.
//! - **Integrity layer**: every write stamps an offset+PRNG pattern that every
//!   read verifies, bounded by a high-water mark of contiguously written bytes.

pub mod adapter;
pub mod config;
pub mod error;
pub mod integrity;
pub mod output;
pub mod queue;
pub mod stats;
pub mod sweep;
pub mod util;
pub mod worker;
pub mod workload;

pub use error::DiskBenchError;

/// Result type used throughout diskbench-rs
pub type Result<T> = anyhow::Result<T>;
