//! Builds the initial population.
//!
//! Agents `0..initial_infections` start infected and the rest susceptible, all with a zero
//! days-infected counter. Positions are drawn uniformly over the grid, with x and y taken
//! from separate placement streams so the two axes are independent.
use rand::Rng;
use rayon::prelude::*;

use crate::define_rng;
use crate::error::PandemicError;
use crate::log::{debug, trace};
use crate::parameters::Parameters;
use crate::people::{InfectionStatus, Population, StatusCounts};
use crate::random::{partition_count, RandomStreamPartitioner, PARTITION_SIZE};

define_rng!(XPlacementRng);
define_rng!(YPlacementRng);

/// Validates `parameters` and allocates and seeds a population for them. Nothing is allocated
/// if validation fails.
///
/// # Errors
///
/// Returns `PandemicError::ConfigError` if the parameters are invalid, in particular when
/// more people are initially infected than exist.
pub fn initialize_population(
    parameters: &Parameters,
    partitioner: &RandomStreamPartitioner,
) -> Result<(Population, StatusCounts), PandemicError> {
    parameters.validate()?;
    trace!("initializing population of {}", parameters.population);

    let size = parameters.population;
    let infected = parameters.initial_infections;

    let states: Vec<InfectionStatus> = (0..size)
        .map(|index| {
            if index < infected {
                InfectionStatus::Infected
            } else {
                InfectionStatus::Susceptible
            }
        })
        .collect();

    let workers = partition_count(size);
    let x_locations = place(
        size,
        parameters.width,
        partitioner.partition(XPlacementRng, 0, workers),
    );
    let y_locations = place(
        size,
        parameters.height,
        partitioner.partition(YPlacementRng, 0, workers),
    );

    let population = Population {
        states,
        x_locations,
        y_locations,
        days_infected: vec![0; size],
    };
    let counts = StatusCounts {
        susceptible: size - infected,
        infected,
        immune: 0,
        dead: 0,
    };
    debug!("initial counts: {:?}", counts);
    Ok((population, counts))
}

/// Draws one coordinate in `0..extent` per agent, worker `w` filling partition `w`.
fn place<R: Rng + Send>(size: usize, extent: u32, streams: Vec<R>) -> Vec<u32> {
    let mut locations = vec![0; size];
    locations
        .par_chunks_mut(PARTITION_SIZE)
        .zip(streams.into_par_iter())
        .for_each(|(chunk, mut rng)| {
            for location in chunk.iter_mut() {
                *location = rng.random_range(0..extent);
            }
        });
    locations
}
