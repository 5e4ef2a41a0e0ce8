//! CLI argument parsing using clap
//!
//! One flag per field of spec.md §6's worker-options surface, mirroring the
//! original tool's `apr_getopt` table (`machineId`, `bufsize`, `files`,
//! `queueDepth`, `requestSize`, `sectorSize`, `complete`, `xmlOutput`,
//! `keepFiles`, `validateExisting`, `randomData`, `time`,
//! `preparationTime`) one-for-one.

use clap::Parser;
use std::path::PathBuf;

/// diskbench-rs - direct-IO disk bandwidth, IOPS and latency benchmark
#[derive(Parser, Debug)]
#[command(name = "diskbench-rs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output identification
    #[arg(short = 'm', long = "machine-id", default_value = "Unknown")]
    pub machine_id: String,

    /// IO buffer size per worker (e.g. 32M, 64k). Limits concurrent IO.
    #[arg(short = 'b', long = "bufsize", default_value = "32M")]
    pub bufsize: String,

    /// Target file[s]: `path[;size[;iolimit]]`, repeatable. `size`/`iolimit`
    /// accept suffixes (k/M/G); `iolimit` defaults to `size` when omitted.
    #[arg(short = 'f', long = "files", required = true, value_delimiter = ',')]
    pub files: Vec<String>,

    /// Turn pseudorandom write data on (1, default) or off (0)
    #[arg(short = 'd', long = "random-data", default_value = "1")]
    pub random_data: u8,

    /// Queue depths to sweep, comma-separated. Default: auto (1,2,4,... until
    /// throughput stops improving)
    #[arg(short = 'q', long = "queue-depth", value_delimiter = ',')]
    pub queue_depth: Option<Vec<usize>>,

    /// Request sizes to sweep, comma-separated, accepts size suffixes.
    /// Default: auto (sector-size, 2x, 4x, ... until throughput stops improving)
    #[arg(short = 'r', long = "request-size", value_delimiter = ',')]
    pub request_size: Option<Vec<String>>,

    /// Minimum IO size / alignment
    #[arg(short = 's', long = "sector-size", default_value = "512")]
    pub sector_size: u64,

    /// Execution time per test point, in seconds
    #[arg(short = 't', long = "time", default_value = "30")]
    pub time: u64,

    /// Max preparation (pre-fill) time before tests, in seconds
    #[arg(short = 'p', long = "preparation-time", default_value = "300")]
    pub preparation_time: u64,

    /// Run a short test (default; sequential capped at 128K, random at 4K)
    /// rather than a complete sweep
    #[arg(short = 'c', long = "complete", default_value = "0")]
    pub complete: u8,

    /// Write test results to this XML file
    #[arg(short = 'x', long = "xml-output")]
    pub xml_output: Option<PathBuf>,

    /// Don't delete files this run created
    #[arg(short = 'k', long = "keep-files")]
    pub keep_files: bool,

    /// Validate integrity of existing files instead of running the sweep
    #[arg(short = 'v', long = "validate-existing")]
    pub validate_existing: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Parse a size string with an optional k/K, m/M, or g/G suffix (powers of 1024).
pub fn parse_size(s: &str) -> anyhow::Result<u64> {
    let s = s.trim();
    let (digits, multiplier) = match s.chars().last() {
        Some(c) if c.eq_ignore_ascii_case(&'k') => (&s[..s.len() - 1], 1024u64),
        Some(c) if c.eq_ignore_ascii_case(&'m') => (&s[..s.len() - 1], 1024 * 1024),
        Some(c) if c.eq_ignore_ascii_case(&'g') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1),
    };
    let value: u64 = digits.trim().parse().map_err(|_| anyhow::anyhow!("invalid size '{s}'"))?;
    Ok(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_accepts_suffixes() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("4k").unwrap(), 4096);
        assert_eq!(parse_size("32M").unwrap(), 32 * 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("abc").is_err());
    }
}
