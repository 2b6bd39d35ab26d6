//! Random stream partitioning.
//!
//! Every stochastic stage draws from a named logical stream, declared with [`define_rng!`].
//! A stage that runs on several workers asks the [`RandomStreamPartitioner`] for one
//! substream per worker. Substream seeds are derived by hashing the base seed, the stream's
//! name, an epoch (the simulated day) and the worker index, so:
//!
//! * workers never share a generator and never contend on one,
//! * two stream identities (e.g. x-movement and y-movement) are decorrelated,
//! * the same stream on a different day starts from a fresh seed.
//!
//! Workers here are the fixed-size agent partitions of [`partition_ranges`], not OS threads.
//! The number of partitions depends only on the population size, which makes a run
//! reproducible for a given base seed no matter how many threads execute it.
mod macros;

use std::ops::Range;

use log::trace;
use rand::{Rng, SeedableRng};

use crate::hashing::{hash_str, hash_words};
pub use macros::define_rng;

/// Number of consecutive agent ids handled by one worker partition.
pub const PARTITION_SIZE: usize = 1024;

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng + Rng + Send;
    fn get_name() -> &'static str;
}

/// Returns the number of worker partitions for a population of `population` agents.
pub fn partition_count(population: usize) -> usize {
    population.div_ceil(PARTITION_SIZE)
}

/// Splits `0..population` into contiguous, disjoint ranges of at most [`PARTITION_SIZE`]
/// agent ids. Range `w` is the range owned by worker `w`; it lines up with
/// `slice.chunks(PARTITION_SIZE).nth(w)`.
pub fn partition_ranges(population: usize) -> Vec<Range<usize>> {
    (0..partition_count(population))
        .map(|worker| {
            let start = worker * PARTITION_SIZE;
            start..(start + PARTITION_SIZE).min(population)
        })
        .collect()
}

/// Derives independent substreams of named random streams from a single base seed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomStreamPartitioner {
    base_seed: u64,
}

impl RandomStreamPartitioner {
    pub fn new(base_seed: u64) -> Self {
        trace!("initializing random stream partitioner (seed={})", base_seed);
        RandomStreamPartitioner { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Creates the generator for one worker of the stream `R` in the given epoch.
    pub fn substream<R: RngId>(&self, _rng_id: R, epoch: u64, worker: usize) -> R::RngType {
        let stream_seed = self.base_seed.wrapping_add(hash_str(R::get_name()));
        R::RngType::seed_from_u64(hash_words(stream_seed, &[epoch, worker as u64]))
    }

    /// Creates `workers` substreams of the stream `R` for the given epoch. Element `w` belongs
    /// to worker `w`.
    pub fn partition<R: RngId>(&self, rng_id: R, epoch: u64, workers: usize) -> Vec<R::RngType> {
        trace!(
            "partitioning stream {} (epoch={}) into {} substreams",
            R::get_name(),
            epoch,
            workers
        );
        (0..workers)
            .map(|worker| self.substream(rng_id, epoch, worker))
            .collect()
    }
}
