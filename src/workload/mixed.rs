//! Mixed workload generator
//!
//! Fixed 75% read / 25% write split. Within each side, one in 32 (reads) or
//! one in 16 (writes) requests is sequential; the rest are uniform-random.
//! Sequential traffic walks one of four independent cursors - forward/
//! backward, crossed with read/write - so read and write sequential streams
//! never share position. Block sizes are drawn from a 13-entry table with
//! probability weighted by `1/ratio^2`, where `ratio` is how far a candidate
//! size is from a reference size (4KiB for random traffic, 128KiB for
//! sequential), so sizes near the reference are picked far more often than
//! sizes far from it.

use super::Request;
use crate::integrity::xorshift64;

const BLOCK_SIZES: [u32; 13] = [
    512, 1024, 2048, 4096, 8192, 16384, 32768, 65536, 131072, 262144, 524288, 1048576, 2097152,
];
const RANDOM_REFERENCE: f64 = 4096.0;
const SEQUENTIAL_REFERENCE: f64 = 128.0 * 1024.0;

pub struct MixedGenerator {
    min_blocksize_idx: usize,
    blocksizes: usize,
    random_prob: [u32; 13],
    sequential_prob: [u32; 13],
    seq_read_fwd: u64,
    seq_read_bwd: u64,
    seq_write_fwd: u64,
    seq_write_bwd: u64,
    seed: u64,
}

impl MixedGenerator {
    pub fn new(req_size: u64, seed: u64) -> Self {
        let mut min_blocksize_idx = 0usize;
        while min_blocksize_idx < BLOCK_SIZES.len() - 1 && (BLOCK_SIZES[min_blocksize_idx] as u64) < req_size {
            min_blocksize_idx += 1;
        }
        let blocksizes = BLOCK_SIZES.len() - min_blocksize_idx;

        let mut random_factor = [0.0f64; 13];
        let mut sequential_factor = [0.0f64; 13];

        for i in min_blocksize_idx..min_blocksize_idx + blocksizes {
            let bs = BLOCK_SIZES[i] as f64;

            let random_ratio = if bs < RANDOM_REFERENCE { RANDOM_REFERENCE / bs } else { bs / RANDOM_REFERENCE };
            let mut rf = 1.0 / (random_ratio * random_ratio);

            let sequential_ratio =
                if bs < SEQUENTIAL_REFERENCE { SEQUENTIAL_REFERENCE / bs } else { bs / SEQUENTIAL_REFERENCE };
            let mut sf = 1.0 / (sequential_ratio * sequential_ratio);

            if i > min_blocksize_idx {
                rf += random_factor[i - 1];
                sf += sequential_factor[i - 1];
            }
            random_factor[i] = rf;
            sequential_factor[i] = sf;
        }

        let last = min_blocksize_idx + blocksizes - 1;
        let random_total = random_factor[last];
        let sequential_total = sequential_factor[last];

        let mut random_prob = [0u32; 13];
        let mut sequential_prob = [0u32; 13];
        for i in min_blocksize_idx..=last {
            random_prob[i] = (u32::MAX as f64 * (random_factor[i] / random_total)) as u32;
            sequential_prob[i] = (u32::MAX as f64 * (sequential_factor[i] / sequential_total)) as u32;
        }

        MixedGenerator {
            min_blocksize_idx,
            blocksizes,
            random_prob,
            sequential_prob,
            seq_read_fwd: 0,
            seq_read_bwd: 0,
            seq_write_fwd: 0,
            seq_write_bwd: 0,
            seed,
        }
    }

    pub fn seed_mut(&mut self) -> &mut u64 {
        &mut self.seed
    }

    fn pick_size(table: &[u32; 13], start: usize, end: usize, draw: u32) -> u64 {
        for i in start..end {
            if draw < table[i] {
                return BLOCK_SIZES[i] as u64;
            }
        }
        BLOCK_SIZES[end] as u64
    }

    fn random_iosize(&self, draw: u32) -> u64 {
        Self::pick_size(&self.random_prob, self.min_blocksize_idx, self.min_blocksize_idx + self.blocksizes - 1, draw)
    }

    fn sequential_iosize(&self, draw: u32) -> u64 {
        Self::pick_size(
            &self.sequential_prob,
            self.min_blocksize_idx,
            self.min_blocksize_idx + self.blocksizes - 1,
            draw,
        )
    }

    fn advance_cursor(cursor: &mut u64, iosize: u64, filesize: u64, forward: bool) -> u64 {
        if forward {
            if *cursor + iosize > filesize {
                *cursor = 0;
            }
            let offset = *cursor;
            *cursor += iosize;
            offset
        } else {
            if *cursor < iosize {
                *cursor = filesize;
            }
            *cursor -= iosize;
            *cursor
        }
    }

    pub fn fill_request(&mut self, filesize: u64) -> Request {
        let random_base = xorshift64(&mut self.seed);
        let low = (random_base & 0xFFFF_FFFF) as u32;
        let high = (random_base >> 32) as u32;
        let forward = low & 1 != 0;

        let write = (low as f64) >= 0.75 * (u32::MAX as f64);

        if !write {
            if low & 0x1F == 0 {
                let iosize = self.sequential_iosize(high);
                let cursor = if forward { &mut self.seq_read_fwd } else { &mut self.seq_read_bwd };
                let offset = Self::advance_cursor(cursor, iosize, filesize, forward);
                Request { offset, size: iosize as u32, write: false }
            } else {
                let iosize = self.random_iosize(high);
                let offset = (random_base % (filesize / iosize)) * iosize;
                Request { offset, size: iosize as u32, write: false }
            }
        } else if low & 0x1F <= 1 {
            let iosize = self.sequential_iosize(high);
            let cursor = if forward { &mut self.seq_write_fwd } else { &mut self.seq_write_bwd };
            let offset = Self::advance_cursor(cursor, iosize, filesize, forward);
            Request { offset, size: iosize as u32, write: true }
        } else {
            let iosize = self.random_iosize(high);
            let offset = (random_base % (filesize / iosize)) * iosize;
            Request { offset, size: iosize as u32, write: true }
        }
    }

    pub fn max_io_size() -> u64 {
        *BLOCK_SIZES.last().unwrap() as u64
    }

    pub fn weighted_io_size() -> u64 {
        4096
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_tables_are_monotonically_nondecreasing() {
        let gen = MixedGenerator::new(512, 1);
        for w in gen.random_prob[gen.min_blocksize_idx..gen.min_blocksize_idx + gen.blocksizes].windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn requests_stay_within_file_bounds() {
        let filesize = 16 * 1024 * 1024u64;
        let mut gen = MixedGenerator::new(4096, 777);
        for _ in 0..500 {
            let req = gen.fill_request(filesize);
            assert!(req.offset + req.size as u64 <= filesize + MixedGenerator::max_io_size());
        }
    }

    #[test]
    fn min_blocksize_idx_respects_requested_req_size() {
        let gen = MixedGenerator::new(64 * 1024, 1);
        assert!(BLOCK_SIZES[gen.min_blocksize_idx] as u64 >= 64 * 1024);
    }
}
