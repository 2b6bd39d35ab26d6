use rand::Rng;
use rayon::prelude::*;

use crate::context::SimulationContext;
use crate::define_rng;
use crate::log::{debug, trace};
use crate::people::{InfectionStatus, Population, StageTally};
use crate::random::{partition_count, PARTITION_SIZE};

define_rng!(ProgressionRng);

/// Resolves every infected agent whose days-infected counter equals the disease duration
/// exactly: it dies with probability `deadliness / 100` and becomes immune otherwise.
pub fn run(context: &mut SimulationContext) -> StageTally {
    let SimulationContext {
        parameters,
        partitioner,
        population,
        counts,
        statistics,
        day,
        ..
    } = context;
    trace!("day {}: progression", day);

    let workers = partition_count(population.len());
    let streams = partitioner.partition(ProgressionRng, u64::from(*day), workers);
    let duration = parameters.disease_duration;
    let deadliness = parameters.deadliness;

    let Population {
        states,
        days_infected,
        ..
    } = population;
    let tally: StageTally = states
        .par_chunks_mut(PARTITION_SIZE)
        .zip(days_infected.par_chunks(PARTITION_SIZE))
        .zip(streams.into_par_iter())
        .map(|((states, days), mut rng)| {
            let mut tally = StageTally::default();
            for (state, days) in states.iter_mut().zip(days) {
                if *state != InfectionStatus::Infected || *days != duration {
                    continue;
                }
                tally.recovery_attempts += 1;
                if rng.random_ratio(deadliness, 100) {
                    *state = InfectionStatus::Dead;
                    tally.deaths += 1;
                } else {
                    *state = InfectionStatus::Immune;
                    tally.recoveries += 1;
                }
            }
            tally
        })
        .sum();

    counts.apply(&tally);
    statistics.record(&tally);
    debug!(
        "day {}: {} recovered, {} died",
        day, tally.recoveries, tally.deaths
    );
    tally
}
