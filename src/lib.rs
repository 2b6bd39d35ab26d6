//! A parallel agent-based simulation of a disease spreading on a grid
//!
//! People live on a bounded 2-D grid and the simulation advances one day at a
//! time. Every day each living person takes a random step of at most one cell
//! per axis, susceptible people close to an infected person may catch the
//! disease, and infected people who have been sick for the full duration of
//! the disease either recover with immunity or die.
//!
//! The central object is the [`SimulationContext`], which owns the population
//! and runs the day pipeline described in [`stages`]. Each stage is a
//! data-parallel pass over the population, executed on a `rayon` thread pool.
//! Random numbers come from per-partition substreams (see [`random`]), so a run
//! is reproducible for a given seed no matter how many threads execute it.
//!
//! Everything that only looks at the simulation between days is a
//! [`DayObserver`]:
//! * [`display::TextDisplay`] draws the grid to the terminal.
//! * [`report::CountsReport`] writes the per-day state counts to a CSV file.
//!
//! The `pandemic` binary wires these together from command line arguments (see
//! [`runner`]).
pub mod context;
pub mod display;
pub mod error;
pub mod execution_stats;
pub mod hashing;
pub mod log;
pub mod parameters;
pub mod people;
#[cfg(feature = "progress_bar")]
pub mod progress;
pub mod random;
pub mod report;
pub mod runner;
pub mod stages;

pub use context::{DayObserver, SimulationContext};
pub use error::PandemicError;
pub use crate::log::{debug, error, info, trace, warn};
pub use parameters::Parameters;
pub use people::{AgentId, InfectionStatus, Population, Position, RunStatistics, StatusCounts};

// Re-exports for use by `define_rng!`
pub use paste;
pub use rand;
