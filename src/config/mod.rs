//! Configuration: CLI parsing plus validation into a `Config` the driver runs.

pub mod cli;

use cli::{parse_size, Cli};
use std::path::PathBuf;
use std::time::Duration;

/// One target file/device and its size/iolimit, parsed from `-f`.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub path: PathBuf,
    pub size: u64,
    pub iolimit: u64,
}

/// Fully parsed and validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub machine_id: String,
    pub bufsize: u64,
    pub targets: Vec<TargetSpec>,
    pub random_data: bool,
    pub queue_depths: Option<Vec<usize>>,
    pub request_sizes: Option<Vec<u64>>,
    pub sector_size: u64,
    pub execution_time: Duration,
    pub preparation_time: Duration,
    pub complete: bool,
    pub xml_output: Option<PathBuf>,
    pub keep_files: bool,
    pub validate_existing: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let bufsize = parse_size(&cli.bufsize)?;
        if bufsize == 0 {
            anyhow::bail!("bufsize must be greater than 0");
        }

        let mut targets = Vec::with_capacity(cli.files.len());
        for spec in &cli.files {
            let mut parts = spec.split(';');
            let path = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| anyhow::anyhow!("empty file spec"))?;
            let size = match parts.next() {
                Some(s) if !s.is_empty() => parse_size(s)?,
                _ => 0,
            };
            let iolimit = match parts.next() {
                Some(s) if !s.is_empty() => parse_size(s)?,
                _ => size,
            };
            targets.push(TargetSpec { path: PathBuf::from(path), size, iolimit });
        }
        if targets.is_empty() {
            anyhow::bail!("at least one target file must be given via -f");
        }

        let queue_depths = cli.queue_depth.clone();
        if let Some(ref depths) = queue_depths {
            if depths.iter().any(|&d| d == 0 || d > 1024) {
                anyhow::bail!("queue depths must be between 1 and 1024");
            }
        }

        let request_sizes = cli.request_size.as_ref().map(|sizes| sizes.iter().map(|s| parse_size(s)).collect::<anyhow::Result<Vec<_>>>()).transpose()?;

        Ok(Config {
            machine_id: cli.machine_id.clone(),
            bufsize,
            targets,
            random_data: cli.random_data != 0,
            queue_depths,
            request_sizes,
            sector_size: cli.sector_size,
            execution_time: Duration::from_secs(cli.time),
            preparation_time: Duration::from_secs(cli.preparation_time),
            complete: cli.complete != 0,
            xml_output: cli.xml_output.clone(),
            keep_files: cli.keep_files,
            validate_existing: cli.validate_existing,
        })
    }

    /// Auto-sweep applies (with adaptive termination) whenever neither `-q`
    /// nor `-r` was given.
    pub fn auto_sweep(&self) -> bool {
        self.queue_depths.is_none() && self.request_sizes.is_none()
    }

    /// Request sizes to sweep: explicit list if given, else a doubling
    /// progression from `sector_size`, capped per spec.md §6's quick-mode
    /// signature sizes when `complete` is off.
    pub fn effective_request_sizes(&self, max_signature: u64) -> Vec<u64> {
        if let Some(sizes) = &self.request_sizes {
            return sizes.clone();
        }
        let cap = if self.complete { u64::MAX } else { max_signature };
        let mut sizes = Vec::new();
        let mut size = self.sector_size;
        while size <= cap {
            sizes.push(size);
            size *= 2;
        }
        sizes
    }

    /// Queue depths to sweep: explicit list if given, else 1,2,4,... up to 64.
    pub fn effective_queue_depths(&self) -> Vec<usize> {
        if let Some(depths) = &self.queue_depths {
            return depths.clone();
        }
        let mut depths = Vec::new();
        let mut depth = 1usize;
        while depth <= 64 {
            depths.push(depth);
            depth *= 2;
        }
        depths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_files(files: &[&str]) -> Cli {
        Cli {
            machine_id: "Unknown".into(),
            bufsize: "32M".into(),
            files: files.iter().map(|s| s.to_string()).collect(),
            random_data: 1,
            queue_depth: None,
            request_size: None,
            sector_size: 512,
            time: 30,
            preparation_time: 300,
            complete: 0,
            xml_output: None,
            keep_files: false,
            validate_existing: false,
        }
    }

    #[test]
    fn parses_file_spec_with_size_and_iolimit() {
        let cli = cli_with_files(&["/tmp/foo;1G;512M"]);
        let cfg = Config::from_cli(&cli).unwrap();
        assert_eq!(cfg.targets[0].size, 1024 * 1024 * 1024);
        assert_eq!(cfg.targets[0].iolimit, 512 * 1024 * 1024);
    }

    #[test]
    fn iolimit_defaults_to_size_when_omitted() {
        let cli = cli_with_files(&["/tmp/foo;1G"]);
        let cfg = Config::from_cli(&cli).unwrap();
        assert_eq!(cfg.targets[0].iolimit, cfg.targets[0].size);
    }

    #[test]
    fn auto_sweep_requires_both_axes_unset() {
        let mut cli = cli_with_files(&["/tmp/foo;1G"]);
        let cfg = Config::from_cli(&cli).unwrap();
        assert!(cfg.auto_sweep());

        cli.queue_depth = Some(vec![4]);
        let cfg = Config::from_cli(&cli).unwrap();
        assert!(!cfg.auto_sweep());
    }

    #[test]
    fn effective_request_sizes_doubles_from_sector_size() {
        let cli = cli_with_files(&["/tmp/foo;1G"]);
        let cfg = Config::from_cli(&cli).unwrap();
        let sizes = cfg.effective_request_sizes(4096);
        assert_eq!(sizes, vec![512, 1024, 2048, 4096]);
    }
}
