//! The population: every agent's infection status, grid position and days-infected counter.
//!
//! Agents are stored as a structure of arrays. Row `i` of every column belongs to the agent
//! with id `i`; the id is stable for the whole run and is handed out as the opaque
//! [`AgentId`] type. Reporting and display code reads the population through the accessors
//! below. Only the stages in [`crate::stages`] write to it.
//!
//! The columns are allocated once by the [initializer](crate::people::initializer) and keep
//! their length for the rest of the run, so an `AgentId` obtained from a population is always
//! in range for that population.
mod counts;
pub mod initializer;

use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

pub use counts::{RunStatistics, StageTally, StatusCounts};

/// Identifies one agent. Only this crate can construct one; use [`Population::agent_ids`] or
/// [`Population::agent_id`] to obtain them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AgentId(usize);

impl AgentId {
    pub(crate) fn new(index: usize) -> Self {
        AgentId(index)
    }

    /// The row of this agent in the population's columns.
    pub fn index(self) -> usize {
        self.0
    }
}

// `AgentId(7)` displays as "7".
impl Display for AgentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for AgentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AgentId").field(&self.0).finish()
    }
}

/// Disease state of an agent. Transitions only go forward:
/// `Susceptible -> Infected -> {Immune, Dead}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfectionStatus {
    Susceptible,
    Infected,
    Immune,
    Dead,
}

impl InfectionStatus {
    /// Immune and dead agents never change state again.
    pub fn is_terminal(self) -> bool {
        matches!(self, InfectionStatus::Immune | InfectionStatus::Dead)
    }

    /// The character used for this state by the text display.
    pub fn glyph(self) -> char {
        match self {
            InfectionStatus::Susceptible => 'o',
            InfectionStatus::Infected => 'X',
            InfectionStatus::Immune => 'I',
            InfectionStatus::Dead => ' ',
        }
    }
}

/// A cell of the grid. Both coordinates are zero-based.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Position { x, y }
    }
}

/// Every agent's state, position and days-infected counter, one column per field. Row `i`
/// belongs to the agent with id `i`.
#[derive(Clone, Debug)]
pub struct Population {
    pub(crate) states: Vec<InfectionStatus>,
    pub(crate) x_locations: Vec<u32>,
    pub(crate) y_locations: Vec<u32>,
    pub(crate) days_infected: Vec<u32>,
}

impl Population {
    /// Builds a population from explicit rows. Every agent starts with `days_infected == 0`.
    #[cfg(test)]
    pub(crate) fn from_agents(agents: &[(InfectionStatus, Position)]) -> Self {
        Population {
            states: agents.iter().map(|(state, _)| *state).collect(),
            x_locations: agents.iter().map(|(_, position)| position.x).collect(),
            y_locations: agents.iter().map(|(_, position)| position.y).collect(),
            days_infected: vec![0; agents.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the id of the agent in row `index`, or `None` if there is no such agent.
    pub fn agent_id(&self, index: usize) -> Option<AgentId> {
        (index < self.len()).then(|| AgentId::new(index))
    }

    /// Iterates over every agent id in increasing order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.len()).map(AgentId::new)
    }

    pub fn state(&self, agent_id: AgentId) -> InfectionStatus {
        self.states[agent_id.0]
    }

    pub fn position(&self, agent_id: AgentId) -> Position {
        Position::new(self.x_locations[agent_id.0], self.y_locations[agent_id.0])
    }

    /// Number of completed days the agent has spent infected. Frozen once the agent is
    /// immune or dead.
    pub fn days_infected(&self, agent_id: AgentId) -> u32 {
        self.days_infected[agent_id.0]
    }

    pub fn states(&self) -> &[InfectionStatus] {
        &self.states
    }

    pub fn x_locations(&self) -> &[u32] {
        &self.x_locations
    }

    pub fn y_locations(&self) -> &[u32] {
        &self.y_locations
    }

    /// Counts the agents in each state by scanning the whole population.
    pub fn tabulate(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for state in &self.states {
            match state {
                InfectionStatus::Susceptible => counts.susceptible += 1,
                InfectionStatus::Infected => counts.infected += 1,
                InfectionStatus::Immune => counts.immune += 1,
                InfectionStatus::Dead => counts.dead += 1,
            }
        }
        counts
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, agent_id: AgentId, state: InfectionStatus) {
        self.states[agent_id.0] = state;
    }

    #[cfg(test)]
    pub(crate) fn set_days_infected(&mut self, agent_id: AgentId, days: u32) {
        self.days_infected[agent_id.0] = days;
    }
}
