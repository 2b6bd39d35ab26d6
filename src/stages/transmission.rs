use rand::Rng;
use rayon::prelude::*;

use crate::context::SimulationContext;
use crate::define_rng;
use crate::log::{debug, trace};
use crate::people::{InfectionStatus, Population, Position, StageTally};
use crate::random::{partition_count, PARTITION_SIZE};

define_rng!(TransmissionRng);

/// True if some infected position lies in the open square of side `2 * radius - 1` centered
/// on `position`, i.e. both coordinate distances are strictly below `radius`. A radius of
/// zero exposes nobody.
pub fn is_exposed(position: Position, infected: &[Position], radius: u32) -> bool {
    infected
        .iter()
        .any(|other| position.x.abs_diff(other.x) < radius && position.y.abs_diff(other.y) < radius)
}

/// Gives every exposed susceptible agent one chance, with probability `contagiousness / 100`,
/// of becoming infected. Newly infected agents start with a zero days-infected counter.
pub fn run(context: &mut SimulationContext) -> StageTally {
    let SimulationContext {
        parameters,
        partitioner,
        population,
        infected_positions,
        counts,
        statistics,
        day,
        ..
    } = context;
    trace!("day {}: transmission", day);

    let workers = partition_count(population.len());
    let streams = partitioner.partition(TransmissionRng, u64::from(*day), workers);
    let radius = parameters.infection_radius;
    let contagiousness = parameters.contagiousness;
    let infected: &[Position] = infected_positions;

    let Population {
        states,
        x_locations,
        y_locations,
        days_infected,
    } = population;
    let tally: StageTally = states
        .par_chunks_mut(PARTITION_SIZE)
        .zip(days_infected.par_chunks_mut(PARTITION_SIZE))
        .zip(x_locations.par_chunks(PARTITION_SIZE))
        .zip(y_locations.par_chunks(PARTITION_SIZE))
        .zip(streams.into_par_iter())
        .map(|((((states, days), xs), ys), mut rng)| {
            let mut tally = StageTally::default();
            let rows = states.iter_mut().zip(days.iter_mut()).zip(xs).zip(ys);
            for (((state, days), x), y) in rows {
                if *state != InfectionStatus::Susceptible
                    || !is_exposed(Position::new(*x, *y), infected, radius)
                {
                    continue;
                }
                tally.infection_attempts += 1;
                if rng.random_ratio(contagiousness, 100) {
                    *state = InfectionStatus::Infected;
                    *days = 0;
                    tally.infections += 1;
                }
            }
            tally
        })
        .sum();

    counts.apply(&tally);
    statistics.record(&tally);
    debug!(
        "day {}: {} of {} exposed agents infected",
        day, tally.infections, tally.infection_attempts
    );
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context_with_agents;
    use crate::parameters::Parameters;
    use crate::stages::locator;

    fn parameters(contagiousness: u32, infection_radius: u32) -> Parameters {
        Parameters {
            width: 20,
            height: 20,
            contagiousness,
            infection_radius,
            ..Parameters::default()
        }
    }

    #[test]
    fn exposure_uses_open_square() {
        let infected = [Position::new(5, 5)];
        // Diagonal corner of the square is inside.
        assert!(is_exposed(Position::new(6, 6), &infected, 2));
        // Distance equal to the radius on either axis is outside.
        assert!(!is_exposed(Position::new(7, 5), &infected, 2));
        assert!(!is_exposed(Position::new(5, 3), &infected, 2));
        // Radius 1 only covers the same cell.
        assert!(is_exposed(Position::new(5, 5), &infected, 1));
        assert!(!is_exposed(Position::new(5, 6), &infected, 1));
        // Radius 0 covers nothing.
        assert!(!is_exposed(Position::new(5, 5), &infected, 0));
        assert!(!is_exposed(Position::new(5, 5), &[], 3));
    }

    #[test]
    fn certain_transmission_infects_neighbors() {
        let mut context = context_with_agents(
            parameters(100, 2),
            &[
                (InfectionStatus::Infected, Position::new(5, 5)),
                (InfectionStatus::Susceptible, Position::new(6, 6)),
                (InfectionStatus::Susceptible, Position::new(4, 5)),
                (InfectionStatus::Susceptible, Position::new(7, 5)),
                (InfectionStatus::Immune, Position::new(5, 5)),
            ],
        );
        locator::run(&mut context);
        let tally = run(&mut context);

        let population = context.population();
        let state = |i| population.state(population.agent_id(i).unwrap());
        assert_eq!(state(1), InfectionStatus::Infected);
        assert_eq!(state(2), InfectionStatus::Infected);
        assert_eq!(state(3), InfectionStatus::Susceptible);
        assert_eq!(state(4), InfectionStatus::Immune);
        assert_eq!(tally.infection_attempts, 2);
        assert_eq!(tally.infections, 2);
        assert_eq!(context.counts().infected, 3);
        assert_eq!(context.counts().susceptible, 1);
        assert_eq!(context.statistics().infections, 2);
    }

    #[test]
    fn unexposed_agents_never_transition() {
        let mut agents = vec![(InfectionStatus::Infected, Position::new(0, 0))];
        agents.extend((0..100).map(|i| {
            (
                InfectionStatus::Susceptible,
                Position::new(10 + i % 10, 10 + i / 10),
            )
        }));
        let mut context = context_with_agents(parameters(100, 3), &agents);
        locator::run(&mut context);
        let tally = run(&mut context);
        assert_eq!(tally, StageTally::default());
        assert_eq!(context.counts().susceptible, 100);
    }

    #[test]
    fn zero_contagiousness_only_counts_attempts() {
        let agents = vec![
            (InfectionStatus::Infected, Position::new(3, 3)),
            (InfectionStatus::Susceptible, Position::new(3, 4)),
            (InfectionStatus::Susceptible, Position::new(2, 2)),
        ];
        let mut context = context_with_agents(parameters(0, 2), &agents);
        locator::run(&mut context);
        let tally = run(&mut context);
        assert_eq!(tally.infection_attempts, 2);
        assert_eq!(tally.infections, 0);
        assert_eq!(context.counts().susceptible, 2);
    }

    #[test]
    fn newly_infected_do_not_spread_the_same_day() {
        // Agent 1 is infected by agent 0, but agent 2 is only near agent 1 and the list of
        // infected positions was taken before transmission started.
        let agents = vec![
            (InfectionStatus::Infected, Position::new(0, 0)),
            (InfectionStatus::Susceptible, Position::new(1, 0)),
            (InfectionStatus::Susceptible, Position::new(2, 0)),
        ];
        let mut context = context_with_agents(parameters(100, 2), &agents);
        locator::run(&mut context);
        let tally = run(&mut context);
        assert_eq!(tally.infections, 1);
        let population = context.population();
        assert_eq!(
            population.state(population.agent_id(2).unwrap()),
            InfectionStatus::Susceptible
        );
    }
}
