use std::ops::Deref;

use crate::context::SimulationContext;
use crate::log::trace;
use crate::people::{InfectionStatus, Population, Position};

/// Positions of every currently infected agent, in agent-id order. Refreshed once per day
/// before transmission and read-only for the rest of the day.
#[derive(Clone, Debug, Default)]
pub struct InfectedPositions {
    positions: Vec<Position>,
}

impl InfectedPositions {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        InfectedPositions {
            positions: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn refresh(&mut self, population: &Population) {
        self.positions.clear();
        self.positions.extend(
            population
                .agent_ids()
                .filter(|agent| population.state(*agent) == InfectionStatus::Infected)
                .map(|agent| population.position(agent)),
        );
    }
}

impl Deref for InfectedPositions {
    type Target = [Position];

    fn deref(&self) -> &[Position] {
        &self.positions
    }
}

/// Rebuilds the context's infected-position list from the population.
pub fn run(context: &mut SimulationContext) {
    let SimulationContext {
        population,
        infected_positions,
        day,
        ..
    } = context;
    infected_positions.refresh(population);
    trace!("day {}: located {} infected", day, infected_positions.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_infected_in_id_order() {
        let population = Population::from_agents(&[
            (InfectionStatus::Infected, Position::new(4, 4)),
            (InfectionStatus::Susceptible, Position::new(1, 1)),
            (InfectionStatus::Immune, Position::new(2, 2)),
            (InfectionStatus::Infected, Position::new(0, 3)),
            (InfectionStatus::Dead, Position::new(3, 0)),
        ]);
        let mut infected = InfectedPositions::with_capacity(population.len());
        infected.refresh(&population);
        assert_eq!(&*infected, &[Position::new(4, 4), Position::new(0, 3)]);

        // A refresh replaces the previous day's list.
        let population = Population::from_agents(&[(
            InfectionStatus::Susceptible,
            Position::new(0, 0),
        )]);
        infected.refresh(&population);
        assert!(infected.is_empty());
    }
}
