//! Uniform-random workload generator
//!
//! Picks a uniformly-random block index in `[0, filesize/req_size)` on each
//! request and converts it to a byte offset. The block count is fixed at
//! construction time from the file size at the start of the test.

use super::Request;
use crate::integrity::xorshift64;

pub struct RandomGenerator {
    write: bool,
    req_size: u64,
    blocks: u64,
    seed: u64,
}

impl RandomGenerator {
    pub fn new(write: bool, req_size: u64, filesize: u64, seed: u64) -> Self {
        RandomGenerator { write, req_size, blocks: filesize / req_size, seed }
    }

    pub fn fill_request(&mut self) -> Request {
        let random_base = xorshift64(&mut self.seed);
        let offset = (random_base % self.blocks) * self.req_size;
        Request { offset, size: self.req_size as u32, write: self.write }
    }

    pub fn seed_mut(&mut self) -> &mut u64 {
        &mut self.seed
    }

    pub fn req_size(&self) -> u64 {
        self.req_size
    }

    /// Number of aligned block positions in the file. Zero when `req_size`
    /// exceeds the file size - callers must skip rather than divide by zero.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    pub fn weighted_io_size() -> u64 {
        4096
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_always_req_size_aligned_and_in_range() {
        let filesize = 1 << 20;
        let req_size = 4096u64;
        let mut gen = RandomGenerator::new(false, req_size, filesize, 12345);
        for _ in 0..100 {
            let req = gen.fill_request();
            assert_eq!(req.offset % req_size, 0);
            assert!(req.offset < filesize);
        }
    }
}
