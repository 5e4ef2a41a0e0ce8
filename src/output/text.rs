//! Human-readable text table, matching the original tool's
//! `print_statistics_header`/`dump_statistics` column layout.

use crate::stats::{Aggregate, Statistics, TestLine};
use crate::util::time::{format_bytes, format_duration, format_throughput};

const SEPARATOR: &str =
    "-------------------------------------------------------------------------------------------------------------------------------------------------------";

pub fn print_header() {
    println!(
        "{:<25}  {:>9}  {:>8}  {:>12}  {:>13}  {:>10}  {:>10}  {:>11}  {:>11}  {:>11}  {:>11}",
        "", "Parallel", "Avg IO", "", "", "Bytes", "Bytes", "Time", "Min", "Avg", "Max"
    );
    println!(
        "{:<25}  {:>9}  {:>8}  {:>12}  {:>13}  {:>10}  {:>10}  {:>11}  {:>11}  {:>11}  {:>11}",
        "Workload", "IOs", "Size", "Throughput", "IOPS", "Written", "Read", "Elapsed", "Latency", "Latency", "Latency"
    );
    println!("{SEPARATOR}");
}

pub fn print_line(line: &TestLine) {
    let avg_io_size = if line.total_requests() > 0 { line.total_bytes() / line.total_requests() } else { 0 };
    println!(
        "{:<25}  {:>9}  {:>8}  {:>12}  {:>13.1}  {:>10}  {:>10}  {:>11}  {:>11}  {:>11}  {:>11}",
        line.description,
        line.max_active,
        format_bytes(avg_io_size),
        format_throughput(line.bytes_per_second()),
        line.iops(),
        format_bytes(line.bytes_written),
        format_bytes(line.bytes_read),
        format_duration(line.total_elapsed),
        line.min_latency.map(format_duration).unwrap_or_else(|| "-".into()),
        format_duration(line.avg_latency),
        line.max_latency.map(format_duration).unwrap_or_else(|| "-".into()),
    );
}

pub fn print_statistics(statistics: &Statistics) {
    println!();
    println!("{}", statistics.name);
    print_header();
    for line in &statistics.lines {
        print_line(line);
    }
}

pub fn print_summary(aggregate: &Aggregate) {
    println!();
    println!("Summary");
    println!("{SEPARATOR}");
    println!("  Total bytes:        {}", format_bytes(aggregate.total_bytes));
    println!("  Total requests:     {}", aggregate.total_requests);
    println!("  Min line throughput: {}", format_throughput(aggregate.min_line_throughput));
    println!("  Max line throughput: {}", format_throughput(aggregate.max_line_throughput));
    println!("  Peak concurrency:   {}", aggregate.peak_active);
    println!("  Weighted score:     {}", format_throughput(aggregate.score()));
}
