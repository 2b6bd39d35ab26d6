use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde_derive::Serialize;

/// Number of agents in each state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub immune: usize,
    pub dead: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.immune + self.dead
    }

    /// Moves agents between the counters according to the transitions recorded in `tally`.
    pub(crate) fn apply(&mut self, tally: &StageTally) {
        self.susceptible -= tally.infections;
        self.infected += tally.infections;
        self.infected -= tally.recoveries + tally.deaths;
        self.immune += tally.recoveries;
        self.dead += tally.deaths;
    }
}

/// Transitions observed by one worker during one stage. Worker tallies are combined with
/// `+`, which is associative and commutative, so the merge order of workers never matters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StageTally {
    /// Susceptible agents that had an infected agent in range.
    pub infection_attempts: usize,
    /// Susceptible agents that became infected.
    pub infections: usize,
    /// Infected agents that reached the end of the disease.
    pub recovery_attempts: usize,
    /// Infected agents that became immune.
    pub recoveries: usize,
    /// Infected agents that died.
    pub deaths: usize,
}

impl Add for StageTally {
    type Output = StageTally;

    fn add(self, other: StageTally) -> StageTally {
        StageTally {
            infection_attempts: self.infection_attempts + other.infection_attempts,
            infections: self.infections + other.infections,
            recovery_attempts: self.recovery_attempts + other.recovery_attempts,
            recoveries: self.recoveries + other.recoveries,
            deaths: self.deaths + other.deaths,
        }
    }
}

impl AddAssign for StageTally {
    fn add_assign(&mut self, other: StageTally) {
        *self = *self + other;
    }
}

impl Sum for StageTally {
    fn sum<I: Iterator<Item = StageTally>>(iter: I) -> StageTally {
        iter.fold(StageTally::default(), Add::add)
    }
}

/// Totals over the whole run, used by the end-of-run summary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub infection_attempts: usize,
    pub infections: usize,
    pub recovery_attempts: usize,
    pub deaths: usize,
}

impl RunStatistics {
    pub(crate) fn record(&mut self, tally: &StageTally) {
        self.infection_attempts += tally.infection_attempts;
        self.infections += tally.infections;
        self.recovery_attempts += tally.recovery_attempts;
        self.deaths += tally.deaths;
    }

    /// Percentage of infection attempts that succeeded.
    #[allow(clippy::cast_precision_loss)]
    pub fn actual_contagiousness(&self) -> f64 {
        100.0 * self.infections as f64 / self.infection_attempts.max(1) as f64
    }

    /// Percentage of resolved infections that ended in death.
    #[allow(clippy::cast_precision_loss)]
    pub fn actual_deadliness(&self) -> f64 {
        100.0 * self.deaths as f64 / self.recovery_attempts.max(1) as f64
    }
}
