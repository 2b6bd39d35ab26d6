use rayon::prelude::*;

use crate::context::SimulationContext;
use crate::log::trace;
use crate::people::{InfectionStatus, Population};

/// Adds one day to the counter of every agent that is still infected. Runs after
/// transmission and progression: agents resolved today keep their final count, and agents
/// infected today are counted today, so an agent infected on day `d` resolves on day
/// `d + disease_duration`.
pub fn run(context: &mut SimulationContext) {
    let SimulationContext {
        population, day, ..
    } = context;
    trace!("day {}: day counter", day);

    let Population {
        states,
        days_infected,
        ..
    } = population;
    days_infected
        .par_iter_mut()
        .zip(states.par_iter())
        .filter(|(_, state)| **state == InfectionStatus::Infected)
        .for_each(|(days, _)| *days += 1);
}
