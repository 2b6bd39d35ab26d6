//! Diagnostic logging. Log messages describe what the simulation does internally (which stage
//! runs, how many agents changed state on a day). They are not the per-day counts report, which
//! is written by `crate::report`.
//!
//! The five `log` macros are re-exported here and at the crate root:
//!
//! ```rust
//! use pandemic::info;
//!
//! info!("placing agents");
//! ```
//!
//! Logging is off until a [`LogSpec`] is applied. The binary takes one with `--log-level`. A spec
//! is a comma separated list of entries, each either a bare level, which becomes the default
//! for every module, or `module=level` for one module path and everything below it:
//!
//! ```rust
//! use pandemic::log::{apply_log_spec, LogSpec};
//!
//! // Run start and finish, plus the daily tallies of the transmission stage.
//! let spec: LogSpec = "info,pandemic::stages::transmission=debug".parse().unwrap();
//! apply_log_spec(&spec);
//! ```
//!
//! Levels are `off`, `error`, `warn`, `info`, `debug` and `trace`, in any case.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(all(feature = "logging", feature = "progress_bar"))]
mod progress_bar_encoder;

#[cfg(not(feature = "logging"))]
mod null_logger;

use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
#[cfg(feature = "logging")]
use log4rs::Handle;

use crate::error::PandemicError;
use crate::hashing::HashMap;

/// Module levels in force before any spec is applied. Partition setup in `crate::random`
/// traces once per stage per day, so it stays at `debug` unless a spec names it.
const DEFAULT_MODULE_LEVELS: [(&str, LevelFilter); 1] = [("pandemic::random", LevelFilter::Debug)];

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A parsed logging request, such as `warn,pandemic::stages=trace`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogSpec {
    /// Level for modules without an entry of their own. `None` keeps the current one.
    pub level: Option<LevelFilter>,
    /// `(module path, level)` pairs in the order they were written.
    pub modules: Vec<(String, LevelFilter)>,
}

fn parse_level(text: &str) -> Result<LevelFilter, PandemicError> {
    LevelFilter::from_str(text.trim())
        .map_err(|_| PandemicError::ConfigError(format!("unknown log level: {}", text.trim())))
}

impl FromStr for LogSpec {
    type Err = PandemicError;

    fn from_str(text: &str) -> Result<LogSpec, PandemicError> {
        let mut spec = LogSpec::default();
        for entry in text.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            match entry.split_once('=') {
                Some((module, level)) => {
                    let module = module.trim();
                    if module.is_empty() {
                        return Err(PandemicError::ConfigError(format!(
                            "missing module path in log entry: {entry}"
                        )));
                    }
                    spec.modules.push((module.to_string(), parse_level(level)?));
                }
                None if spec.level.is_some() => {
                    return Err(PandemicError::ConfigError(format!(
                        "more than one default log level in: {text}"
                    )));
                }
                None => spec.level = Some(parse_level(entry)?),
            }
        }
        if spec == LogSpec::default() {
            return Err(PandemicError::ConfigError("empty log specification".to_string()));
        }
        Ok(spec)
    }
}

/// The levels currently installed and the handle of the installed logger. There is one
/// instance per process, behind `LOG_CONFIGURATION`.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_levels: HashMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        LogConfiguration {
            global_log_level: LevelFilter::Off,
            module_levels: DEFAULT_MODULE_LEVELS
                .iter()
                .map(|(module, level)| ((*module).to_string(), *level))
                .collect(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    /// Folds `spec` into the current levels. Returns true if anything changed.
    fn merge(&mut self, spec: &LogSpec) -> bool {
        let mut changed = false;
        if let Some(level) = spec.level {
            changed |= self.global_log_level != level;
            self.global_log_level = level;
        }
        for (module, level) in &spec.modules {
            changed |= self.module_levels.insert(module.clone(), *level) != Some(*level);
        }
        changed
    }
}

/// Applies `spec` on top of the current configuration and (re)installs the logger.
pub fn apply_log_spec(spec: &LogSpec) {
    let mut configuration = get_log_configuration();
    if configuration.merge(spec) {
        configuration.set_config();
    }
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(text: &str) -> LogSpec {
        text.parse().unwrap()
    }

    #[test]
    fn parses_bare_level() {
        assert_eq!(
            spec("Debug"),
            LogSpec {
                level: Some(LevelFilter::Debug),
                modules: Vec::new(),
            }
        );
    }

    #[test]
    fn parses_module_entries() {
        assert_eq!(
            spec(" warn , pandemic::stages=trace,pandemic::report = info,"),
            LogSpec {
                level: Some(LevelFilter::Warn),
                modules: vec![
                    ("pandemic::stages".to_string(), LevelFilter::Trace),
                    ("pandemic::report".to_string(), LevelFilter::Info),
                ],
            }
        );
        assert_eq!(spec("pandemic::context=info").level, None);
    }

    #[test]
    fn rejects_malformed_specs() {
        for text in ["loud", "info,debug", "=info", "pandemic::stages=", "", " , "] {
            let result = text.parse::<LogSpec>();
            assert!(
                matches!(result, Err(PandemicError::ConfigError(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn merge_keeps_unnamed_modules() {
        let mut configuration = LogConfiguration::default();
        assert_eq!(configuration.global_log_level, LevelFilter::Off);
        assert_eq!(
            configuration.module_levels.get("pandemic::random"),
            Some(&LevelFilter::Debug)
        );

        assert!(configuration.merge(&spec("info,pandemic::stages=debug")));
        assert_eq!(configuration.global_log_level, LevelFilter::Info);
        assert_eq!(configuration.module_levels.len(), 2);
        assert_eq!(
            configuration.module_levels.get("pandemic::stages"),
            Some(&LevelFilter::Debug)
        );

        // A module-only spec leaves the default level alone.
        assert!(configuration.merge(&spec("pandemic::random=trace")));
        assert_eq!(configuration.global_log_level, LevelFilter::Info);
        assert_eq!(
            configuration.module_levels.get("pandemic::random"),
            Some(&LevelFilter::Trace)
        );

        // Applying the same levels again is not a change.
        assert!(!configuration.merge(&spec("info,pandemic::stages=debug")));
    }
}
