//! Workload generators
//!
//! Each test point runs one generator, chosen from a closed set: sequential,
//! uniform-random and a fixed 75/25 read/write mixed generator. Each
//! generator owns both its positional state (cursors, block-size
//! probability tables) and its own PRNG stream - used for offset selection
//! where applicable, and always for the integrity data pattern stamped on
//! its writes (see [`crate::integrity`]).

mod mixed;
mod random;
mod sequential;

pub use mixed::MixedGenerator;
pub use random::RandomGenerator;
pub use sequential::SequentialGenerator;

/// Default seed a freshly-constructed generator starts from.
pub const DEFAULT_SEED: u64 = 88_172_645_463_325_252;

/// One IO operation a generator wants performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub offset: u64,
    pub size: u32,
    pub write: bool,
}

/// Closed set of workload generators, dispatched by tag rather than `dyn Trait`.
pub enum Generator {
    Sequential(SequentialGenerator),
    Random(RandomGenerator),
    Mixed(MixedGenerator),
}

impl Generator {
    pub fn sequential(write: bool, req_size: u64) -> Self {
        Generator::Sequential(SequentialGenerator::new(write, req_size, DEFAULT_SEED))
    }

    pub fn random(write: bool, req_size: u64, filesize: u64) -> Self {
        Generator::Random(RandomGenerator::new(write, req_size, filesize, DEFAULT_SEED))
    }

    pub fn mixed(req_size: u64) -> Self {
        Generator::Mixed(MixedGenerator::new(req_size, DEFAULT_SEED))
    }

    /// Produce the next request.
    pub fn fill_request(&mut self, filesize: u64) -> Request {
        match self {
            Generator::Sequential(g) => g.fill_request(filesize),
            Generator::Random(g) => g.fill_request(),
            Generator::Mixed(g) => g.fill_request(filesize),
        }
    }

    /// This generator's integrity-stamping PRNG state, for [`crate::queue::AsyncQueue`]
    /// to draw from when it stamps a write issued by this generator.
    pub fn seed_mut(&mut self) -> &mut u64 {
        match self {
            Generator::Sequential(g) => g.seed_mut(),
            Generator::Random(g) => g.seed_mut(),
            Generator::Mixed(g) => g.seed_mut(),
        }
    }

    /// Largest single request this generator can issue - used to size
    /// per-slot buffers.
    pub fn max_io_size(&self) -> u64 {
        match self {
            Generator::Sequential(g) => g.req_size(),
            Generator::Random(g) => g.req_size(),
            Generator::Mixed(_) => MixedGenerator::max_io_size(),
        }
    }

    /// Reference IO size used to weight this generator's results against
    /// others of different characteristic request size (see [`crate::stats`]).
    pub fn weighted_io_size(&self) -> u64 {
        match self {
            Generator::Sequential(_) => SequentialGenerator::weighted_io_size(),
            Generator::Random(_) => RandomGenerator::weighted_io_size(),
            Generator::Mixed(_) => MixedGenerator::weighted_io_size(),
        }
    }

    /// Whether this generator can produce a request at all against a file of
    /// the given size - false only for the random generator when `req_size`
    /// exceeds `filesize` (`blocks == 0`, which would otherwise divide by zero).
    pub fn is_viable(&self, _filesize: u64) -> bool {
        match self {
            Generator::Random(g) => g.blocks() > 0,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_dispatch_reaches_the_right_variant() {
        let mut gen = Generator::sequential(true, 4096);
        let req = gen.fill_request(1 << 20);
        assert_eq!(req.offset, 0);
        assert_eq!(req.size, 4096);
        assert!(req.write);
    }
}
