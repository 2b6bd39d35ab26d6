//! The per-day pipeline.
//!
//! A day runs these stages strictly in order, each one a barrier for the next:
//!
//! 1. [`locator`] refreshes the compact list of infected positions.
//! 2. [`movement`] moves every living agent by at most one cell per axis.
//! 3. [`transmission`] infects susceptible agents near an infected position.
//! 4. [`progression`] resolves agents at the end of the disease into immune or dead.
//! 5. [`day_counter`] advances the days-infected counter of every infected agent.
//!
//! Inside a stage the agents are split into the contiguous partitions of
//! [`crate::random::partition_ranges`]. Each partition is processed by one worker with its
//! own random substream, so no two workers write the same slot or share a generator. Counter
//! changes are tallied per worker and summed once the stage is done.
pub mod day_counter;
pub mod locator;
pub mod movement;
pub mod progression;
pub mod transmission;

use std::fmt::{Display, Formatter};

/// The timed stages of a day, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Locate,
    Movement,
    Transmission,
    Progression,
    DayCounter,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Locate,
        Stage::Movement,
        Stage::Transmission,
        Stage::Progression,
        Stage::DayCounter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Locate => "locate",
            Stage::Movement => "movement",
            Stage::Transmission => "transmission",
            Stage::Progression => "progression",
            Stage::DayCounter => "day counter",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
