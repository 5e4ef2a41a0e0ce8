//! diskbench-rs CLI entry point
//!
//! Parses the CLI, opens one [`Worker`] per target file, then runs the fixed
//! sequence of named tests - sequential write, sequential read, random
//! write, random read, mixed - each swept over request size x queue depth,
//! printing a results table per test and an overall weighted summary, with
//! an optional XML report alongside.

use anyhow::Result;
use diskbench_rs::config::cli::Cli;
use diskbench_rs::config::Config;
use diskbench_rs::output::{text, xml};
use diskbench_rs::stats::Aggregate;
use diskbench_rs::sweep::run_sweep;
use diskbench_rs::util::time::{format_bytes, format_throughput};
use diskbench_rs::worker::Worker;
use diskbench_rs::workload::Generator;
use std::time::Duration;

const SEQUENTIAL_SIGNATURE: u64 = 128 * 1024;
const RANDOM_SIGNATURE: u64 = 4096;

type GeneratorFactory = Box<dyn Fn(u64, u64) -> Generator>;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::from_cli(&cli)?;

    let mut workers = Vec::with_capacity(config.targets.len());
    for target in &config.targets {
        let worker = Worker::open(
            target.path.clone(),
            target.size,
            target.iolimit,
            config.bufsize as usize,
            cfg!(feature = "io_uring"),
            config.random_data,
            config.targets.len(),
        )?;
        workers.push(worker);
    }

    let result = if config.validate_existing { validate_existing(&mut workers) } else { run_sweeps(&config, &mut workers) };

    let cleanup_result = cleanup(workers, config.keep_files);
    result?;
    cleanup_result
}

fn validate_existing(workers: &mut [Worker]) -> Result<()> {
    println!("Validating integrity of {} existing file(s)...", workers.len());
    for worker in workers.iter_mut() {
        worker.set_high_water_mark(worker.filesize);
    }
    let make_generator = |req_size: u64, _filesize: u64| Generator::sequential(false, req_size);
    let statistics = run_sweep(
        "Validate existing",
        workers,
        make_generator,
        &[4096],
        &[1],
        Duration::from_secs(300),
        false,
    )?;
    text::print_statistics(&statistics);
    println!("Validation passed.");
    Ok(())
}

fn run_sweeps(config: &Config, workers: &mut [Worker]) -> Result<()> {
    println!("Machine: {}", config.machine_id);
    println!("Targets: {}", config.targets.len());
    println!();

    let auto = config.auto_sweep();
    let depths = config.effective_queue_depths();

    let named_tests: Vec<(&str, u64, GeneratorFactory)> = vec![
        ("Sequential write", SEQUENTIAL_SIGNATURE, Box::new(|r, _f| Generator::sequential(true, r))),
        ("Sequential read", SEQUENTIAL_SIGNATURE, Box::new(|r, _f| Generator::sequential(false, r))),
        ("Random write", RANDOM_SIGNATURE, Box::new(|r, f| Generator::random(true, r, f))),
        ("Random read", RANDOM_SIGNATURE, Box::new(|r, f| Generator::random(false, r, f))),
        ("Mixed", RANDOM_SIGNATURE, Box::new(|r, _f| Generator::mixed(r))),
    ];

    let mut all_statistics = Vec::new();
    let mut aggregate = Aggregate::default();

    for (name, signature, make_generator) in named_tests {
        let req_sizes = config.effective_request_sizes(signature);
        let statistics = run_sweep(name, workers, make_generator, &req_sizes, &depths, config.execution_time, auto)?;

        for worker in workers.iter() {
            worker.flush()?;
        }
        for line in &statistics.lines {
            aggregate.absorb(line);
        }
        text::print_statistics(&statistics);
        if let Some(sig_line) = statistics.signature(signature) {
            println!(
                "  signature ({}): {}",
                format_bytes(signature),
                format_throughput(sig_line.bytes_per_second())
            );
        }
        all_statistics.push(statistics);
    }

    text::print_summary(&aggregate);

    if let Some(path) = &config.xml_output {
        xml::write_report(path, &all_statistics, &aggregate)?;
        println!("\nXML report written to {}", path.display());
    }

    Ok(())
}

fn cleanup(workers: Vec<Worker>, keep_files: bool) -> Result<()> {
    if keep_files {
        return Ok(());
    }
    for worker in workers {
        if worker.created {
            worker.delete()?;
        }
    }
    Ok(())
}
