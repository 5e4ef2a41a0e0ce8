//! One worker: a single target file driven through one test point at a time
//!
//! A worker owns the target file and its page-aligned scratch buffer for the
//! whole run; both persist across test points so the integrity high-water
//! mark carried in [`Worker::high_water_mark`] stays meaningful as
//! sequential write, sequential read, random write, random read and mixed
//! phases all run against the same bytes. Everything else - the adapter,
//! the queue, the workload generator - is rebuilt fresh for each test point
//! since queue depth and request size change between them.

use crate::adapter::{self, Adapter};
use crate::queue::{AsyncQueue, QueueStats};
use crate::util::buffer::AlignedBuffer;
use crate::workload::Generator;
use crate::Result;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub struct Worker {
    pub name: String,
    path: PathBuf,
    file: std::fs::File,
    buf: AlignedBuffer,
    pub filesize: u64,
    pub iolimit: u64,
    pub high_water_mark: u64,
    /// Set when this run created or resized the target file (vs. reusing an
    /// existing file/device as-is) - governs whether it's deleted on cleanup.
    pub created: bool,
    use_io_uring: bool,
    write_random: bool,
}

/// Share of free disk space one auto-sized target may claim when
/// `worker_count` targets are stacked in the same run - 80% split evenly so
/// N targets don't each independently try to grab most of the free space.
fn freespace_fraction(worker_count: usize) -> f64 {
    0.8 / worker_count.max(1) as f64
}

impl Worker {
    pub fn open(
        path: PathBuf,
        requested_len: u64,
        iolimit: u64,
        bufsize: usize,
        use_io_uring: bool,
        write_random: bool,
        worker_count: usize,
    ) -> Result<Self> {
        let (file, filesize, created) = adapter::open_target(&path, requested_len, freespace_fraction(worker_count))?;
        let name = path.display().to_string();
        let page_size = adapter::page_size() as usize;
        let buf = AlignedBuffer::new(bufsize, page_size);
        Ok(Worker { name, path, file, buf, filesize, iolimit, high_water_mark: 0, created, use_io_uring, write_random })
    }

    /// Run one test point: submit requests from `generator` for up to
    /// `max_execution_time` (or until `iolimit` bytes have been submitted),
    /// then drain all in-flight IO. Returns aggregate latency/throughput
    /// stats and the wall-clock span actually spent, and advances
    /// [`Worker::high_water_mark`] from whatever writes completed.
    pub fn run_test(
        &mut self,
        mut generator: Generator,
        depth: usize,
        max_execution_time: Duration,
    ) -> Result<(QueueStats, Duration)> {
        let page_size = adapter::page_size() as usize;
        let slots = self.buf.chunks_mut(depth, page_size);

        let mut adapter = if self.use_io_uring {
            #[cfg(feature = "io_uring")]
            {
                Adapter::io_uring(self.file.as_raw_fd(), depth as u32)?
            }
            #[cfg(not(feature = "io_uring"))]
            {
                Adapter::sync(self.file.as_raw_fd())
            }
        } else {
            Adapter::sync(self.file.as_raw_fd())
        };

        let mut queue = AsyncQueue::new(slots, self.write_random, self.high_water_mark);

        let start = Instant::now();
        let mut submitted_bytes = 0u64;
        while start.elapsed() < max_execution_time {
            if !queue.has_free_slot() {
                queue.wait(&mut adapter, 1)?;
                continue;
            }

            let req = generator.fill_request(self.filesize);
            if submitted_bytes + req.size as u64 > self.iolimit {
                break;
            }

            queue.submit(&mut adapter, req, generator.seed_mut())?;
            submitted_bytes += req.size as u64;

            if queue.free() == 0 {
                queue.wait(&mut adapter, 1)?;
            } else {
                queue.wait(&mut adapter, 0)?;
            }
        }
        queue.barrier(&mut adapter)?;
        let elapsed = start.elapsed();

        self.high_water_mark = queue.high_water_mark();
        Ok((queue.stats(), elapsed))
    }

    /// Total bytes available in this worker's pre-allocated scratch buffer,
    /// used by the sweep driver to skip a queue depth whose per-slot share
    /// would fall below a page (spec §4.2's `create` precondition).
    pub fn buffer_capacity(&self) -> usize {
        self.buf.size()
    }

    /// Override the integrity high-water mark - used by `-v` (validate
    /// existing) to treat the whole file as previously written.
    pub fn set_high_water_mark(&mut self, mark: u64) {
        self.high_water_mark = mark;
    }

    pub fn set_len(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.filesize = len;
        Ok(())
    }

    /// Flush pending writes to the device, as done after every test point.
    pub fn flush(&self) -> Result<()> {
        self.file.sync_all().map_err(Into::into)
    }

    /// Remove the target file. Only call when [`Worker::created`] is set and
    /// the keep-files option is off.
    pub fn delete(self) -> Result<()> {
        let path = self.path.clone();
        drop(self.file);
        std::fs::remove_file(path).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freespace_fraction_splits_80_percent_across_stacked_workers() {
        assert_eq!(freespace_fraction(1), 0.8);
        assert_eq!(freespace_fraction(2), 0.4);
        assert_eq!(freespace_fraction(4), 0.2);
    }

    #[test]
    fn freespace_fraction_treats_zero_workers_as_one() {
        assert_eq!(freespace_fraction(0), freespace_fraction(1));
    }
}
