//! Statistics aggregator
//!
//! One [`TestLine`] is produced per completed (description, request-size,
//! queue-depth) test point, combining every participating worker's
//! [`crate::queue::QueueStats`] plus the per-worker weight from
//! spec's scoring rule (penalizes request sizes far from a generator's
//! "natural" size and high queue depth). [`Statistics`] accumulates test
//! lines for one named test (e.g. "Sequential write") across the sweep;
//! [`Aggregate`] accumulates the overall run score across every test.

use crate::queue::QueueStats;
use std::time::Duration;

/// Per-worker contribution to one test point, before combination into a [`TestLine`].
pub struct WorkerContribution {
    pub stats: QueueStats,
    pub elapsed: Duration,
    pub weighted_io_size: u64,
    pub queue_depth: usize,
    pub max_active: usize,
}

/// One worker's raw counters for one test point, kept alongside the combined
/// totals so the report can list per-file results (spec's `workloads/workload`).
#[derive(Debug, Clone, Copy)]
pub struct WorkerSummary {
    pub index: usize,
    pub queue_depth: usize,
    pub stats: QueueStats,
}

/// One completed (description, request-size, queue-depth) test point.
#[derive(Debug, Clone)]
pub struct TestLine {
    pub description: String,
    pub req_size: u64,
    pub depth: usize,

    pub read_requests: u64,
    pub write_requests: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,

    pub total_elapsed: Duration,
    pub min_latency: Option<Duration>,
    pub avg_latency: Duration,
    pub max_latency: Option<Duration>,

    pub max_active: usize,
    pub weight: f64,
    pub weighted_bytes_per_second: f64,

    /// Raw per-worker counters, one entry per participating worker, in the
    /// order they were passed to [`TestLine::combine`].
    pub workers: Vec<WorkerSummary>,
}

impl TestLine {
    /// Combine every participating worker's counters for one test point into
    /// a single line - the per-worker raw counters survive on [`TestLine::workers`]
    /// for report rendering - applying the weighting rule: for each worker,
    /// `distance = max(avg_io_size, weighted_io_size) / min(avg_io_size, weighted_io_size)`,
    /// `weight = 10 / (distance + queue_depth)`; the line's weight is the
    /// average of per-worker weights, its `weighted_bytes_per_second` the
    /// weight-sum of per-worker `bytes/sec`.
    pub fn combine(description: impl Into<String>, req_size: u64, depth: usize, workers: &[WorkerContribution]) -> Option<Self> {
        let worker_count = workers.len();
        if worker_count == 0 {
            return None;
        }

        let mut read_requests = 0u64;
        let mut write_requests = 0u64;
        let mut bytes_read = 0u64;
        let mut bytes_written = 0u64;
        let mut total_latency = Duration::ZERO;
        let mut min_latency: Option<Duration> = None;
        let mut max_latency: Option<Duration> = None;
        let mut max_active = 0usize;
        let mut weight_sum = 0.0f64;
        let mut weighted_bps = 0.0f64;
        let mut total_elapsed = Duration::ZERO;
        let mut summaries = Vec::with_capacity(worker_count);

        for (index, w) in workers.iter().enumerate() {
            summaries.push(WorkerSummary { index, queue_depth: w.queue_depth, stats: w.stats });
            let s = &w.stats;
            read_requests += s.read_requests;
            write_requests += s.write_requests;
            bytes_read += s.read_bytes;
            bytes_written += s.write_bytes;
            total_latency += s.read_elapsed + s.write_elapsed;
            max_active = max_active.max(w.max_active);
            total_elapsed = total_elapsed.max(w.elapsed);

            for (count, lo, hi) in [
                (s.read_requests, s.read_min_latency, s.read_max_latency),
                (s.write_requests, s.write_min_latency, s.write_max_latency),
            ] {
                if count > 0 {
                    min_latency = Some(min_latency.map_or(lo, |m| m.min(lo)));
                    max_latency = Some(max_latency.map_or(hi, |m| m.max(hi)));
                }
            }

            let requests = s.read_requests + s.write_requests;
            let bytes = s.read_bytes + s.write_bytes;
            if requests == 0 || w.elapsed.is_zero() {
                continue;
            }
            let avg_io_size = bytes as f64 / requests as f64;
            let target = w.weighted_io_size as f64;
            let distance = avg_io_size.max(target) / avg_io_size.min(target);
            let weight = 10.0 / (distance + w.queue_depth as f64);
            let bytes_per_second = bytes as f64 / w.elapsed.as_secs_f64();

            weight_sum += weight / worker_count as f64;
            weighted_bps += weight * bytes_per_second;
        }

        let total_requests = read_requests + write_requests;
        if total_requests == 0 {
            return None;
        }
        let avg_latency = total_latency / total_requests as u32;

        Some(TestLine {
            description: description.into(),
            req_size,
            depth,
            read_requests,
            write_requests,
            bytes_read,
            bytes_written,
            total_elapsed,
            min_latency,
            avg_latency,
            max_latency,
            max_active,
            weight: weight_sum,
            weighted_bytes_per_second: weighted_bps,
            workers: summaries,
        })
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_read + self.bytes_written
    }

    pub fn total_requests(&self) -> u64 {
        self.read_requests + self.write_requests
    }

    pub fn bytes_per_second(&self) -> f64 {
        if self.total_elapsed.is_zero() {
            return 0.0;
        }
        self.total_bytes() as f64 / self.total_elapsed.as_secs_f64()
    }

    pub fn iops(&self) -> f64 {
        if self.total_elapsed.is_zero() {
            return 0.0;
        }
        self.total_requests() as f64 / self.total_elapsed.as_secs_f64()
    }
}

/// Every test line collected for one named test (e.g. "Sequential write"),
/// plus separately-tracked lines for "signature" request sizes (128KiB
/// sequential, 4KiB random) that the summary table highlights on their own.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub name: String,
    pub lines: Vec<TestLine>,
}

impl Statistics {
    pub fn new(name: impl Into<String>) -> Self {
        Statistics { name: name.into(), lines: Vec::new() }
    }

    pub fn push(&mut self, line: TestLine) {
        self.lines.push(line);
    }

    /// The line matching a "signature" request size, if this test ever ran it.
    pub fn signature(&self, req_size: u64) -> Option<&TestLine> {
        self.lines.iter().find(|l| l.req_size == req_size)
    }
}

/// Overall run aggregate across every test: summed bytes/requests, summed
/// weighted throughput and weight (their ratio is the run's single
/// comparable score), the extreme per-line throughputs seen, and peak
/// observed concurrency.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub total_bytes: u64,
    pub total_requests: u64,
    pub weighted_bytes_per_second_sum: f64,
    pub weight_sum: f64,
    pub min_line_throughput: f64,
    pub max_line_throughput: f64,
    pub peak_active: usize,
}

impl Aggregate {
    pub fn absorb(&mut self, line: &TestLine) {
        let throughput = line.bytes_per_second();
        if self.total_requests == 0 {
            self.min_line_throughput = throughput;
            self.max_line_throughput = throughput;
        } else {
            self.min_line_throughput = self.min_line_throughput.min(throughput);
            self.max_line_throughput = self.max_line_throughput.max(throughput);
        }
        self.total_bytes += line.total_bytes();
        self.total_requests += line.total_requests();
        self.weighted_bytes_per_second_sum += line.weighted_bytes_per_second;
        self.weight_sum += line.weight;
        self.peak_active = self.peak_active.max(line.max_active);
    }

    /// `Σ weighted_bytes_per_second / Σ weight` - the run's single comparable score.
    pub fn score(&self) -> f64 {
        if self.weight_sum == 0.0 {
            0.0
        } else {
            self.weighted_bytes_per_second_sum / self.weight_sum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(read_requests: u64, read_bytes: u64, elapsed_secs: u64) -> WorkerContribution {
        let stats = QueueStats { read_requests, read_bytes, ..QueueStats::default() };
        WorkerContribution {
            stats,
            elapsed: Duration::from_secs(elapsed_secs),
            weighted_io_size: 4096,
            queue_depth: 4,
            max_active: 4,
        }
    }

    #[test]
    fn combine_computes_weighted_throughput() {
        let contributions = vec![contribution(1000, 1000 * 4096, 1)];
        let line = TestLine::combine("Random read", 4096, 4, &contributions).unwrap();
        assert_eq!(line.read_requests, 1000);
        assert!(line.weight > 0.0);
        assert!(line.weighted_bytes_per_second > 0.0);
    }

    #[test]
    fn combine_returns_none_for_idle_test_point() {
        let contributions = vec![contribution(0, 0, 1)];
        assert!(TestLine::combine("idle", 4096, 1, &contributions).is_none());
    }

    #[test]
    fn aggregate_score_is_ratio_of_sums() {
        let contributions = vec![contribution(1000, 1000 * 4096, 1)];
        let line = TestLine::combine("Random read", 4096, 4, &contributions).unwrap();
        let mut agg = Aggregate::default();
        agg.absorb(&line);
        assert!((agg.score() - line.weighted_bytes_per_second / line.weight).abs() < 1e-9);
    }
}
