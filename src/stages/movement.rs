use rand::Rng;
use rayon::prelude::*;

use crate::context::SimulationContext;
use crate::define_rng;
use crate::log::trace;
use crate::people::{InfectionStatus, Population, Position};
use crate::random::{partition_count, PARTITION_SIZE};

define_rng!(XMovementRng);
define_rng!(YMovementRng);

/// Returns the position one step of `(dx, dy)` away, or `None` if it lies outside a
/// `width` x `height` grid.
pub fn step(position: Position, dx: i32, dy: i32, width: u32, height: u32) -> Option<Position> {
    let x = position.x.checked_add_signed(dx).filter(|x| *x < width)?;
    let y = position.y.checked_add_signed(dy).filter(|y| *y < height)?;
    Some(Position::new(x, y))
}

/// Moves every agent that is not dead by a random step in `{-1, 0, 1}` on each axis. A step
/// that would leave the grid is dropped as a whole and the agent stays where it is.
pub fn run(context: &mut SimulationContext) {
    let SimulationContext {
        parameters,
        partitioner,
        population,
        day,
        ..
    } = context;
    trace!("day {}: movement", day);

    let workers = partition_count(population.len());
    let x_streams = partitioner.partition(XMovementRng, u64::from(*day), workers);
    let y_streams = partitioner.partition(YMovementRng, u64::from(*day), workers);
    let (width, height) = (parameters.width, parameters.height);

    let Population {
        states,
        x_locations,
        y_locations,
        ..
    } = population;
    x_locations
        .par_chunks_mut(PARTITION_SIZE)
        .zip(y_locations.par_chunks_mut(PARTITION_SIZE))
        .zip(states.par_chunks(PARTITION_SIZE))
        .zip(x_streams.into_par_iter().zip(y_streams.into_par_iter()))
        .for_each(|(((xs, ys), states), (mut x_rng, mut y_rng))| {
            for ((x, y), state) in xs.iter_mut().zip(ys.iter_mut()).zip(states) {
                if *state == InfectionStatus::Dead {
                    continue;
                }
                let dx = x_rng.random_range(-1..=1);
                let dy = y_rng.random_range(-1..=1);
                if let Some(moved) = step(Position::new(*x, *y), dx, dy, width, height) {
                    *x = moved.x;
                    *y = moved.y;
                }
            }
        });
}
