//! Fixed-depth asynchronous IO queue
//!
//! One queue is built per worker per test point from a slice of that
//! worker's pre-allocated [`AlignedBuffer`](crate::util::buffer::AlignedBuffer),
//! cut into `depth` equal slots. A `ready` list tracks which slots are free;
//! `free + active` is always equal to `total`. Completions are reaped in
//! batches, verifying read data and advancing the write high-water mark as
//! they land.

use crate::adapter::{Adapter, Completion, IoRequest};
use crate::integrity;
use crate::workload::Request;
use crate::Result;
use std::time::{Duration, Instant};

/// Latency and throughput counters accumulated over one queue's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueueStats {
    pub read_requests: u64,
    pub read_bytes: u64,
    pub read_elapsed: Duration,
    pub read_min_latency: Duration,
    pub read_max_latency: Duration,

    pub write_requests: u64,
    pub write_bytes: u64,
    pub write_elapsed: Duration,
    pub write_min_latency: Duration,
    pub write_max_latency: Duration,

    /// Highest `active` count observed over this queue's lifetime.
    pub peak_active: usize,
}

impl QueueStats {
    fn record_read(&mut self, elapsed: Duration, size: u64) {
        if self.read_requests == 0 {
            self.read_min_latency = elapsed;
            self.read_max_latency = elapsed;
        } else {
            self.read_min_latency = self.read_min_latency.min(elapsed);
            self.read_max_latency = self.read_max_latency.max(elapsed);
        }
        self.read_requests += 1;
        self.read_bytes += size;
        self.read_elapsed += elapsed;
    }

    fn record_write(&mut self, elapsed: Duration, size: u64) {
        if self.write_requests == 0 {
            self.write_min_latency = elapsed;
            self.write_max_latency = elapsed;
        } else {
            self.write_min_latency = self.write_min_latency.min(elapsed);
            self.write_max_latency = self.write_max_latency.max(elapsed);
        }
        self.write_requests += 1;
        self.write_bytes += size;
        self.write_elapsed += elapsed;
    }
}

struct InFlight {
    offset: u64,
    size: u32,
    write: bool,
    submitted_at: Instant,
}

/// A fixed set of equally-sized slots cut from one worker's aligned buffer.
pub struct AsyncQueue<'a> {
    slots: Vec<&'a mut [u8]>,
    ready: Vec<usize>,
    in_flight: Vec<Option<InFlight>>,
    active: usize,
    random_data: bool,
    /// Highest offset contiguously written so far by this worker; reads only
    /// verify bytes below this mark. Carried forward across test points by
    /// the caller via [`AsyncQueue::high_water_mark`] / the `high_water`
    /// constructor argument.
    high_water_mark: u64,
    stats: QueueStats,
}

impl<'a> AsyncQueue<'a> {
    pub fn new(slots: Vec<&'a mut [u8]>, random_data: bool, high_water: u64) -> Self {
        let depth = slots.len();
        let ready = (0..depth).collect();
        let in_flight = (0..depth).map(|_| None).collect();
        AsyncQueue { slots, ready, in_flight, active: 0, random_data, high_water_mark: high_water, stats: QueueStats::default() }
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn free(&self) -> usize {
        self.ready.len()
    }

    pub fn has_free_slot(&self) -> bool {
        !self.ready.is_empty()
    }

    pub fn high_water_mark(&self) -> u64 {
        self.high_water_mark
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    /// Stamp (if a write) and submit one request into a free slot.
    ///
    /// `integrity_seed` is the issuing generator's own PRNG state
    /// ([`crate::workload::Generator::seed_mut`]) - each generator stamps its
    /// writes from its own stream rather than a queue- or worker-wide one.
    ///
    /// # Panics
    /// Panics if no slot is free - callers must check [`Self::has_free_slot`]
    /// (or drain completions) first.
    pub fn submit(&mut self, adapter: &mut Adapter, req: Request, integrity_seed: &mut u64) -> Result<()> {
        let slot = self.ready.pop().expect("submit called with no free slots");
        let buf = &mut self.slots[slot][..req.size as usize];

        if req.write {
            integrity::stamp(buf, req.offset, self.random_data, integrity_seed);
        }

        let io_req = IoRequest {
            user_data: slot as u64,
            write: req.write,
            offset: req.offset,
            buf: buf.as_mut_ptr(),
            len: buf.len(),
        };
        adapter.submit(io_req)?;

        self.in_flight[slot] =
            Some(InFlight { offset: req.offset, size: req.size, write: req.write, submitted_at: Instant::now() });
        self.active += 1;
        self.stats.peak_active = self.stats.peak_active.max(self.active);
        Ok(())
    }

    /// Reap at least `min` completions (0 = drain whatever is ready without blocking).
    pub fn wait(&mut self, adapter: &mut Adapter, min: usize) -> Result<usize> {
        if self.active == 0 {
            return Ok(0);
        }
        let completions = adapter.reap(min.min(self.active))?;
        let n = completions.len();
        for Completion { user_data, result } in completions {
            self.complete(user_data as usize, result)?;
        }
        Ok(n)
    }

    /// Block until every in-flight request has completed.
    pub fn barrier(&mut self, adapter: &mut Adapter) -> Result<()> {
        while self.active > 0 {
            self.wait(adapter, self.active)?;
        }
        Ok(())
    }

    fn complete(&mut self, slot: usize, result: std::io::Result<usize>) -> Result<()> {
        let request = self.in_flight[slot].take().expect("completion for unknown slot");
        result.map_err(|e| anyhow::anyhow!("io at offset {} failed: {e}", request.offset))?;

        let elapsed = request.submitted_at.elapsed();
        if request.write {
            self.stats.record_write(elapsed, request.size as u64);
            if request.offset == self.high_water_mark {
                self.high_water_mark = request.offset + request.size as u64;
            }
        } else {
            self.stats.record_read(elapsed, request.size as u64);
            let buf = &self.slots[slot][..request.size as usize];
            if let Err(bad_offset) = integrity::verify(buf, request.offset, self.random_data, self.high_water_mark) {
                return Err(crate::DiskBenchError::IntegrityViolation { offset: bad_offset }.into());
            }
        }

        self.ready.push(slot);
        self.active -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use std::os::unix::io::AsRawFd;
    use tempfile::tempfile;

    #[test]
    fn submit_and_barrier_round_trips_through_sync_adapter() {
        let file = tempfile().unwrap();
        file.set_len(64 * 1024).unwrap();
        let mut adapter = Adapter::sync(file.as_raw_fd());

        let mut raw = vec![0u8; 4096 * 2];
        let slots: Vec<&mut [u8]> = raw.chunks_mut(4096).collect();
        let mut queue = AsyncQueue::new(slots, false, 0);
        let mut seed = 1u64;

        queue.submit(&mut adapter, Request { offset: 0, size: 4096, write: true }, &mut seed).unwrap();
        assert_eq!(queue.free(), 1);
        queue.barrier(&mut adapter).unwrap();
        assert_eq!(queue.high_water_mark(), 4096);
        assert_eq!(queue.free(), 2);

        queue.submit(&mut adapter, Request { offset: 0, size: 4096, write: false }, &mut seed).unwrap();
        queue.barrier(&mut adapter).unwrap();
        assert_eq!(queue.stats().read_requests, 1);
        assert_eq!(queue.stats().write_requests, 1);
    }
}
