//! Text rendering of the grid.
//!
//! The display only ever reads the population. It is registered as a [`DayObserver`] and draws
//! the grid as it stands at the start of each day, after the infected positions have been
//! located and before anyone moves.
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::context::{DayObserver, SimulationContext};
use crate::error::PandemicError;
use crate::people::Population;

/// Glyph for a cell that holds no agent.
pub const EMPTY_CELL: char = '-';

/// Largest grid, in cells, that the text display accepts.
pub const MAX_DISPLAY_CELLS: u64 = 1_000_000;

/// How the grid is shown while the simulation runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    None,
    /// One text frame per day on standard output.
    Text,
}

/// Writes one frame: a `Day N` header followed by `height` rows of `width` glyphs. When
/// several agents share a cell the agent with the highest id is shown.
///
/// # Errors
///
/// Propagates any error from `out`.
pub fn render(
    population: &Population,
    width: u32,
    height: u32,
    day: u32,
    out: &mut impl Write,
) -> io::Result<()> {
    let width = width as usize;
    let mut cells = vec![EMPTY_CELL; width * height as usize];
    for agent in population.agent_ids() {
        let position = population.position(agent);
        let cell = position.y as usize * width + position.x as usize;
        cells[cell] = population.state(agent).glyph();
    }

    writeln!(out, "Day {day}")?;
    if width > 0 {
        for row in cells.chunks(width) {
            let line: String = row.iter().collect();
            writeln!(out, "{line}")?;
        }
    }
    writeln!(out)?;
    out.flush()
}

/// Draws the grid at the start of every day and then waits `microseconds_per_day`.
pub struct TextDisplay {
    out: Box<dyn Write + Send>,
    pause: Duration,
}

impl TextDisplay {
    pub fn new(out: Box<dyn Write + Send>, microseconds_per_day: u64) -> Self {
        TextDisplay {
            out,
            pause: Duration::from_micros(microseconds_per_day),
        }
    }

    pub fn stdout(microseconds_per_day: u64) -> Self {
        TextDisplay::new(Box::new(io::stdout()), microseconds_per_day)
    }
}

impl DayObserver for TextDisplay {
    fn day_started(&mut self, context: &SimulationContext) -> Result<(), PandemicError> {
        let parameters = context.parameters();
        render(
            context.population(),
            parameters.width,
            parameters.height,
            context.current_day(),
            &mut self.out,
        )?;
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::context::tests::context_with_agents;
    use crate::parameters::Parameters;
    use crate::people::{InfectionStatus, Position};

    #[test]
    fn renders_one_glyph_per_cell() {
        let population = Population::from_agents(&[
            (InfectionStatus::Susceptible, Position::new(0, 0)),
            (InfectionStatus::Infected, Position::new(2, 0)),
            (InfectionStatus::Immune, Position::new(1, 1)),
            (InfectionStatus::Dead, Position::new(2, 1)),
        ]);
        let mut out = Vec::new();
        render(&population, 3, 2, 4, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Day 4\no-X\n-I \n\n");
    }

    #[test]
    fn highest_id_wins_shared_cell() {
        let population = Population::from_agents(&[
            (InfectionStatus::Infected, Position::new(0, 0)),
            (InfectionStatus::Immune, Position::new(0, 0)),
        ]);
        let mut out = Vec::new();
        render(&population, 1, 1, 0, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Day 0\nI\n\n");
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn draws_a_frame_per_day() {
        let parameters = Parameters {
            width: 4,
            height: 3,
            total_days: 2,
            threads: 1,
            ..Parameters::default()
        };
        let mut context = context_with_agents(
            parameters,
            &[(InfectionStatus::Susceptible, Position::new(1, 1))],
        );
        let buffer = SharedBuffer::default();
        context.add_observer(Box::new(TextDisplay::new(Box::new(buffer.clone()), 0)));
        context.execute().unwrap();

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let headers: Vec<&str> = output.lines().filter(|l| l.starts_with("Day")).collect();
        assert_eq!(headers, vec!["Day 0", "Day 1", "Day 2"]);
        // The first frame shows the initial position.
        assert!(output.starts_with("Day 0\n----\n-o--\n----\n"));
    }

    #[test]
    fn display_mode_parses_lowercase() {
        let mode: DisplayMode = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(mode, DisplayMode::Text);
        assert_eq!(DisplayMode::default(), DisplayMode::None);
    }
}
