//! The simulation context.
//!
//! A [`SimulationContext`] owns everything a run needs: the parameters, the population, the
//! infected-position list, the aggregate counters, the random stream partitioner and the
//! worker pool. It is created by a validated constructor that also seeds the population, so
//! a stage can never run against an uninitialized or mis-sized population.
//!
//! Code that only needs to look at the simulation between days (a display, a report)
//! implements [`DayObserver`] and is registered with [`SimulationContext::add_observer`].
//! Observers get shared references only.
use std::sync::Arc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::PandemicError;
use crate::execution_stats::{ExecutionProfilingCollector, ExecutionStatistics, StageTimings};
use crate::log::{debug, info, trace};
use crate::parameters::Parameters;
use crate::people::initializer::initialize_population;
use crate::people::{Population, RunStatistics, StatusCounts};
use crate::random::RandomStreamPartitioner;
use crate::stages::locator::InfectedPositions;
use crate::stages::{day_counter, locator, movement, progression, transmission, Stage};

/// Read-only hooks called around each simulated day.
pub trait DayObserver: Send {
    /// Called once the infected positions for `context.current_day()` have been located and
    /// before anyone moves.
    ///
    /// # Errors
    ///
    /// An error stops the run and is returned from [`SimulationContext::execute`].
    fn day_started(&mut self, _context: &SimulationContext) -> Result<(), PandemicError> {
        Ok(())
    }

    /// Called after the whole pipeline of `context.current_day()` has completed.
    ///
    /// # Errors
    ///
    /// An error stops the run and is returned from [`SimulationContext::execute`].
    fn day_finished(&mut self, _context: &SimulationContext) -> Result<(), PandemicError> {
        Ok(())
    }
}

#[derive(Copy, Clone)]
enum DayEvent {
    Started,
    Finished,
}

pub struct SimulationContext {
    pub(crate) parameters: Parameters,
    pub(crate) partitioner: RandomStreamPartitioner,
    pub(crate) population: Population,
    pub(crate) infected_positions: InfectedPositions,
    pub(crate) counts: StatusCounts,
    pub(crate) statistics: RunStatistics,
    pub(crate) day: u32,
    pub(crate) stage_timings: StageTimings,
    execution_profiler: ExecutionProfilingCollector,
    observers: Vec<Box<dyn DayObserver>>,
    pool: Arc<ThreadPool>,
}

impl SimulationContext {
    /// Validates `parameters`, builds the worker pool and seeds the population.
    ///
    /// # Errors
    ///
    /// Returns `PandemicError::ConfigError` if the parameters are invalid (for instance more
    /// initially infected than people), or an error if the worker pool cannot be built.
    pub fn new(parameters: Parameters, base_seed: u64) -> Result<SimulationContext, PandemicError> {
        parameters.validate()?;
        let pool = build_pool(parameters.threads)?;
        let partitioner = RandomStreamPartitioner::new(base_seed);
        let (population, counts) =
            pool.install(|| initialize_population(&parameters, &partitioner))?;
        info!(
            "initialized {} people ({} infected) on a {}x{} grid with {} worker threads",
            population.len(),
            counts.infected,
            parameters.width,
            parameters.height,
            pool.current_num_threads()
        );
        Ok(Self::assemble(parameters, partitioner, population, counts, pool))
    }

    /// Builds a context around an already populated `Population`. Counters are tabulated
    /// from the population.
    #[cfg(test)]
    pub(crate) fn from_population(
        parameters: Parameters,
        base_seed: u64,
        population: Population,
    ) -> Result<SimulationContext, PandemicError> {
        let pool = build_pool(parameters.threads)?;
        let counts = population.tabulate();
        Ok(Self::assemble(
            parameters,
            RandomStreamPartitioner::new(base_seed),
            population,
            counts,
            pool,
        ))
    }

    fn assemble(
        parameters: Parameters,
        partitioner: RandomStreamPartitioner,
        population: Population,
        counts: StatusCounts,
        pool: ThreadPool,
    ) -> SimulationContext {
        let infected_positions = InfectedPositions::with_capacity(population.len());
        SimulationContext {
            parameters,
            partitioner,
            population,
            infected_positions,
            counts,
            statistics: RunStatistics::default(),
            day: 0,
            stage_timings: StageTimings::default(),
            execution_profiler: ExecutionProfilingCollector::new(),
            observers: Vec::new(),
            pool: Arc::new(pool),
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Positions of the agents that were infected when the current day started.
    pub fn infected_positions(&self) -> &InfectedPositions {
        &self.infected_positions
    }

    pub fn counts(&self) -> StatusCounts {
        self.counts
    }

    pub fn statistics(&self) -> RunStatistics {
        self.statistics
    }

    /// The index of the day being simulated, or of the next day to simulate between days.
    pub fn current_day(&self) -> u32 {
        self.day
    }

    pub fn stage_timings(&self) -> &StageTimings {
        &self.stage_timings
    }

    /// CPU time, wall time and peak memory of the process since this context was created.
    pub fn get_execution_statistics(&mut self) -> ExecutionStatistics {
        let population = self.population.len();
        self.execution_profiler.compute_final_statistics(population)
    }

    /// Registers an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: Box<dyn DayObserver>) {
        self.observers.push(observer);
    }

    /// Simulates one day and advances the day index.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by an observer.
    pub fn step_day(&mut self) -> Result<(), PandemicError> {
        trace!("starting day {}", self.day);
        self.run_stage(Stage::Locate, locator::run);
        self.notify(DayEvent::Started)?;

        let pool = Arc::clone(&self.pool);
        pool.install(|| {
            self.run_stage(Stage::Movement, movement::run);
            self.run_stage(Stage::Transmission, transmission::run);
            self.run_stage(Stage::Progression, progression::run);
            self.run_stage(Stage::DayCounter, day_counter::run);
        });

        debug!("day {}: {:?}", self.day, self.counts);
        debug_assert_eq!(self.counts, self.population.tabulate());
        debug_assert_eq!(self.counts.total(), self.population.len());

        self.notify(DayEvent::Finished)?;
        self.day += 1;
        Ok(())
    }

    /// Simulates the remaining days up to and including `total_days`.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by an observer. The run stops at that day.
    pub fn execute(&mut self) -> Result<(), PandemicError> {
        let last_day = self.parameters.total_days;
        info!("simulating days {} through {}", self.day, last_day);
        for _ in self.day..=last_day {
            self.step_day()?;
            self.execution_profiler.refresh();
            #[cfg(feature = "progress_bar")]
            crate::progress::increment_day_progress();
        }
        info!("simulation finished with counts {:?}", self.counts);
        Ok(())
    }

    fn run_stage<T>(&mut self, stage: Stage, body: impl FnOnce(&mut Self) -> T) -> T {
        let start = Instant::now();
        let result = body(self);
        self.stage_timings.record(stage, start.elapsed());
        result
    }

    fn notify(&mut self, event: DayEvent) -> Result<(), PandemicError> {
        let mut observers = std::mem::take(&mut self.observers);
        let result = observers.iter_mut().try_for_each(|observer| match event {
            DayEvent::Started => observer.day_started(self),
            DayEvent::Finished => observer.day_finished(self),
        });
        self.observers = observers;
        result
    }
}

fn build_pool(threads: usize) -> Result<ThreadPool, PandemicError> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("pandemic-worker-{index}"))
        .build()
        .map_err(|error| PandemicError::PandemicError(format!("could not build worker pool: {error}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::people::{InfectionStatus, Position};

    /// A context over an explicit set of agents, for exercising single stages.
    pub(crate) fn context_with_agents(
        parameters: Parameters,
        agents: &[(InfectionStatus, Position)],
    ) -> SimulationContext {
        SimulationContext::from_population(parameters, 42, Population::from_agents(agents))
            .unwrap()
    }

    fn small_parameters() -> Parameters {
        Parameters {
            population: 100,
            initial_infections: 5,
            width: 10,
            height: 10,
            infection_radius: 2,
            disease_duration: 3,
            contagiousness: 100,
            deadliness: 0,
            total_days: 5,
            show_results: false,
            threads: 2,
            ..Parameters::default()
        }
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        let parameters = Parameters {
            population: 4,
            initial_infections: 5,
            ..Parameters::default()
        };
        let result = SimulationContext::new(parameters, 0);
        assert!(matches!(result, Err(PandemicError::ConfigError(_))));
    }

    #[test]
    fn execute_runs_inclusive_day_range() {
        let mut context = SimulationContext::new(small_parameters(), 1).unwrap();
        context.execute().unwrap();
        assert_eq!(context.current_day(), 6);
        assert_eq!(context.counts().total(), 100);
    }

    struct Recorder {
        log: Arc<Mutex<Vec<(char, u32, usize)>>>,
    }

    impl DayObserver for Recorder {
        fn day_started(&mut self, context: &SimulationContext) -> Result<(), PandemicError> {
            self.log.lock().unwrap().push((
                's',
                context.current_day(),
                context.infected_positions().len(),
            ));
            Ok(())
        }

        fn day_finished(&mut self, context: &SimulationContext) -> Result<(), PandemicError> {
            assert_eq!(context.counts().total(), context.population().len());
            self.log
                .lock()
                .unwrap()
                .push(('f', context.current_day(), context.counts().infected));
            Ok(())
        }
    }

    #[test]
    fn observers_see_every_day() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut context = SimulationContext::new(small_parameters(), 3).unwrap();
        context.add_observer(Box::new(Recorder {
            log: Arc::clone(&log),
        }));
        context.execute().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 12);
        assert_eq!(log[0], ('s', 0, 5));
        for day in 0..6u32 {
            assert_eq!(log[2 * day as usize].1, day);
            assert_eq!(log[2 * day as usize + 1].1, day);
        }
        // Infected positions at the start of a day match the infected count at the end of
        // the previous day.
        for day in 1..6 {
            assert_eq!(log[2 * day].2, log[2 * day - 1].2);
        }
    }

    struct Failing;

    impl DayObserver for Failing {
        fn day_finished(&mut self, context: &SimulationContext) -> Result<(), PandemicError> {
            if context.current_day() == 2 {
                return Err("observer failed".into());
            }
            Ok(())
        }
    }

    #[test]
    fn observer_error_stops_run() {
        let mut context = SimulationContext::new(small_parameters(), 3).unwrap();
        context.add_observer(Box::new(Failing));
        assert!(context.execute().is_err());
        assert_eq!(context.current_day(), 2);
    }

    #[test]
    fn stage_timings_are_recorded() {
        let mut context = SimulationContext::new(small_parameters(), 3).unwrap();
        context.step_day().unwrap();
        for stage in Stage::ALL {
            assert_eq!(context.stage_timings().calls(stage), 1);
        }
        let stats = context.get_execution_statistics();
        assert_eq!(stats.population, 100);
    }
}
