//! Run configuration.
//!
//! `Parameters` is read once at startup, from defaults, an optional JSON file and command line
//! overrides (see [`crate::runner`]), validated, and then never changes for the rest of the run.
use std::fs;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::display::{DisplayMode, MAX_DISPLAY_CELLS};
use crate::error::PandemicError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Number of agents.
    pub population: usize,
    /// Agents with ids `0..initial_infections` start out infected.
    pub initial_infections: usize,
    pub width: u32,
    pub height: u32,
    /// Side of the open square neighborhood used by transmission: a susceptible agent is
    /// exposed when both coordinate distances to an infected agent are below this value.
    pub infection_radius: u32,
    /// Days an agent stays infected before it resolves to immune or dead.
    pub disease_duration: u32,
    /// Chance, in percent, that an exposed susceptible agent becomes infected on a day.
    pub contagiousness: u32,
    /// Chance, in percent, that an agent reaching the end of the disease dies.
    pub deadliness: u32,
    /// Last day index of the run. Days `0..=total_days` are simulated.
    pub total_days: u32,
    /// Pause after each displayed day.
    pub microseconds_per_day: u64,
    /// Print the end-of-run summary.
    pub show_results: bool,
    pub display: DisplayMode,
    /// Worker threads; 0 lets the pool pick one per core.
    pub threads: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population: 50,
            initial_infections: 1,
            width: 30,
            height: 30,
            infection_radius: 3,
            disease_duration: 50,
            contagiousness: 30,
            deadliness: 30,
            total_days: 250,
            microseconds_per_day: 100_000,
            show_results: true,
            display: DisplayMode::None,
            threads: 0,
        }
    }
}

impl Parameters {
    /// Reads parameters from a JSON file. Fields missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `PandemicError` if the file cannot be read or is not valid JSON for this type.
    pub fn from_json_file(path: &Path) -> Result<Parameters, PandemicError> {
        trace!("loading parameters from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&contents)?;
        Ok(parameters)
    }

    /// Checks the parameters before anything is allocated.
    ///
    /// # Errors
    ///
    /// Returns `PandemicError::ConfigError` describing the first invalid value.
    pub fn validate(&self) -> Result<(), PandemicError> {
        if self.initial_infections > self.population {
            return Err(PandemicError::ConfigError(format!(
                "initial number of infected ({}) must not exceed total number of people ({})",
                self.initial_infections, self.population
            )));
        }
        if self.population == 0 {
            return Err(PandemicError::ConfigError(
                "population must contain at least one person".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(PandemicError::ConfigError(format!(
                "environment must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.contagiousness > 100 {
            return Err(PandemicError::ConfigError(format!(
                "contagiousness must be a percentage in 0..=100, got {}",
                self.contagiousness
            )));
        }
        if self.deadliness > 100 {
            return Err(PandemicError::ConfigError(format!(
                "deadliness must be a percentage in 0..=100, got {}",
                self.deadliness
            )));
        }
        // The day index after the last simulated day must still fit.
        if self.total_days == u32::MAX {
            return Err(PandemicError::ConfigError(format!(
                "total days must be below {}",
                u32::MAX
            )));
        }
        let cells = u64::from(self.width) * u64::from(self.height);
        if self.display == DisplayMode::Text && cells > MAX_DISPLAY_CELLS {
            return Err(PandemicError::ConfigError(format!(
                "a {}x{} environment is too large for the text display (at most {} cells)",
                self.width, self.height, MAX_DISPLAY_CELLS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn too_many_initial_infections() {
        let parameters = Parameters {
            population: 10,
            initial_infections: 11,
            ..Parameters::default()
        };
        let error = parameters.validate().unwrap_err();
        assert!(matches!(error, PandemicError::ConfigError(_)));
        assert!(error.to_string().contains("(11)"));
    }

    #[test]
    fn all_infected_is_allowed() {
        let parameters = Parameters {
            population: 10,
            initial_infections: 10,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            Parameters {
                population: 0,
                initial_infections: 0,
                ..Parameters::default()
            },
            Parameters {
                width: 0,
                ..Parameters::default()
            },
            Parameters {
                contagiousness: 101,
                ..Parameters::default()
            },
            Parameters {
                deadliness: 250,
                ..Parameters::default()
            },
        ];
        for parameters in cases {
            assert!(matches!(
                parameters.validate(),
                Err(PandemicError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn last_day_must_leave_room_for_the_day_index() {
        let parameters = Parameters {
            total_days: u32::MAX,
            ..Parameters::default()
        };
        assert!(matches!(
            parameters.validate(),
            Err(PandemicError::ConfigError(_))
        ));

        let parameters = Parameters {
            total_days: u32::MAX - 1,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn text_display_limits_grid_size() {
        let huge = Parameters {
            width: u32::MAX,
            height: u32::MAX,
            display: DisplayMode::Text,
            ..Parameters::default()
        };
        let error = huge.validate().unwrap_err();
        assert!(matches!(error, PandemicError::ConfigError(_)));
        assert!(error.to_string().contains("text display"));

        // Without a display the grid is never materialized.
        let undisplayed = Parameters {
            display: DisplayMode::None,
            ..huge.clone()
        };
        assert!(undisplayed.validate().is_ok());

        let largest = Parameters {
            width: 1000,
            height: 1000,
            display: DisplayMode::Text,
            ..Parameters::default()
        };
        assert!(largest.validate().is_ok());
        let one_row_more = Parameters {
            height: 1001,
            ..largest
        };
        assert!(one_row_more.validate().is_err());
    }

    #[test]
    fn loads_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"population": 100, "initial_infections": 5, "display": "text"}}"#
        )
        .unwrap();
        let parameters = Parameters::from_json_file(file.path()).unwrap();
        assert_eq!(parameters.population, 100);
        assert_eq!(parameters.initial_infections, 5);
        assert_eq!(parameters.display, DisplayMode::Text);
        assert_eq!(parameters.width, Parameters::default().width);
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"populaton": 100}}"#).unwrap();
        assert!(matches!(
            Parameters::from_json_file(file.path()),
            Err(PandemicError::JsonError(_))
        ));
    }
}
