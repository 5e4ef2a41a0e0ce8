//! Sweep driver
//!
//! Runs one named test (e.g. "Sequential write") across the cross-product of
//! request size x queue depth for every participating worker, in parallel
//! across workers per test point, with adaptive early-termination on each
//! axis once throughput stops improving three samples in a row.

use crate::stats::{Statistics, TestLine, WorkerContribution};
use crate::worker::Worker;
use crate::workload::Generator;
use std::collections::VecDeque;
use std::time::Duration;

/// Tracks the last three throughput samples on one sweep axis; `push`
/// reports whether the axis should terminate (the newest sample is at or
/// below the mean of the last three samples, including itself).
struct AdaptiveWindow {
    samples: VecDeque<f64>,
}

impl AdaptiveWindow {
    const MIN_TESTS: usize = 3;

    fn new() -> Self {
        AdaptiveWindow { samples: VecDeque::with_capacity(Self::MIN_TESTS) }
    }

    fn push(&mut self, throughput: f64) -> bool {
        self.samples.push_back(throughput);
        if self.samples.len() > Self::MIN_TESTS {
            self.samples.pop_front();
        }
        if self.samples.len() < Self::MIN_TESTS {
            return false;
        }
        let mean: f64 = self.samples.iter().sum::<f64>() / Self::MIN_TESTS as f64;
        throughput <= mean
    }
}

/// Drives one named test over `req_sizes x depths` for every worker in
/// `workers`. `make_generator(req_size, filesize)` builds the per-worker
/// generator for a test point - callers pass a closure that fixes direction
/// (and, for mixed, ignores `req_size`'s direction entirely).
pub fn run_sweep(
    description: &str,
    workers: &mut [Worker],
    make_generator: impl Fn(u64, u64) -> Generator,
    req_sizes: &[u64],
    depths: &[usize],
    max_execution_time: Duration,
    auto_terminate: bool,
) -> crate::Result<Statistics> {
    let page_size = crate::adapter::page_size();
    let mut statistics = Statistics::new(description);
    let mut reqsize_window = AdaptiveWindow::new();

    'reqsize: for &req_size in req_sizes {
        let mut depth_window = AdaptiveWindow::new();
        let mut best_line_for_reqsize: Option<TestLine> = None;

        for &depth in depths {
            let decisions: Vec<Option<Generator>> = workers
                .iter()
                .map(|w| {
                    let generator = make_generator(req_size, w.filesize);
                    let fits = (w.buffer_capacity() as u64) / depth as u64 >= generator.max_io_size().max(page_size);
                    if fits && generator.is_viable(w.filesize) { Some(generator) } else { None }
                })
                .collect();

            if decisions.iter().all(Option::is_none) {
                break; // depth dimension exhausted: buffer too small for every worker from here on
            }

            let contributions: Vec<WorkerContribution> = std::thread::scope(|scope| -> crate::Result<Vec<_>> {
                let mut handles = Vec::new();
                for (worker, decision) in workers.iter_mut().zip(decisions) {
                    let Some(generator) = decision else { continue };
                    let weighted_io_size = generator.weighted_io_size();
                    handles.push(scope.spawn(move || {
                        let (stats, elapsed) = worker.run_test(generator, depth, max_execution_time)?;
                        let max_active = stats.peak_active;
                        Ok::<_, anyhow::Error>(WorkerContribution {
                            stats,
                            elapsed,
                            weighted_io_size,
                            queue_depth: depth,
                            max_active,
                        })
                    }));
                }
                handles.into_iter().map(|h| h.join().expect("worker thread panicked")).collect()
            })?;

            let Some(line) = TestLine::combine(description, req_size, depth, &contributions) else {
                break;
            };
            let throughput = line.bytes_per_second();
            best_line_for_reqsize = match best_line_for_reqsize {
                Some(ref prev) if prev.bytes_per_second() >= throughput => best_line_for_reqsize,
                _ => Some(line.clone()),
            };
            statistics.push(line);

            if auto_terminate && depth_window.push(throughput) {
                break;
            }
        }

        let Some(best) = best_line_for_reqsize else { continue 'reqsize };
        if auto_terminate && reqsize_window.push(best.bytes_per_second()) {
            break;
        }
    }

    Ok(statistics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_window_terminates_on_equality_per_s5() {
        let mut w = AdaptiveWindow::new();
        assert!(!w.push(100.0));
        assert!(!w.push(110.0));
        assert!(!w.push(120.0)); // mean(100,110,120)=110, 120<=110 false
        assert!(w.push(115.0)); // mean(110,120,115)=115, 115<=115 true
    }

    #[test]
    fn adaptive_window_does_not_terminate_on_continued_growth() {
        let mut w = AdaptiveWindow::new();
        w.push(100.0);
        w.push(110.0);
        w.push(120.0);
        assert!(!w.push(121.0)); // mean(110,120,121)=117, 121<=117 false
    }
}
