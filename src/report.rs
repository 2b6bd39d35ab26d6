//! Output written for the user: the per-day counts CSV and the end-of-run summary.
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use serde_derive::Serialize;

use crate::context::{DayObserver, SimulationContext};
use crate::error::PandemicError;
use crate::log::{info, trace};
use crate::people::{RunStatistics, StatusCounts};

/// File name of the per-day counts report, before the prefix is applied.
pub const COUNTS_REPORT_NAME: &str = "counts.csv";

/// Where report files go and whether existing files may be replaced.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        ReportOptions {
            file_prefix: String::new(),
            output_dir: PathBuf::from("."),
            overwrite: false,
        }
    }

    /// Sets the file prefix option (e.g., "run1_")
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut ReportOptions {
        self.file_prefix = file_prefix;
        self
    }

    /// Sets the directory where reports will be output
    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.output_dir = directory;
        self
    }

    /// Sets whether to overwrite existing reports of the same name if they exist
    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", self.file_prefix, name))
    }
}

/// One row of the counts report: the state counts at the end of `day`.
#[derive(Debug, Serialize)]
pub struct CountsReportItem {
    pub day: u32,
    pub susceptible: usize,
    pub infected: usize,
    pub immune: usize,
    pub dead: usize,
}

impl CountsReportItem {
    pub fn new(day: u32, counts: StatusCounts) -> Self {
        CountsReportItem {
            day,
            susceptible: counts.susceptible,
            infected: counts.infected,
            immune: counts.immune,
            dead: counts.dead,
        }
    }
}

// Creates the file and all parent directories. Refuses to replace an existing file unless
// `overwrite` is set.
fn create_report_file(path: &Path, overwrite: bool) -> Result<File, PandemicError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    if path.exists() && !overwrite {
        return Err(PandemicError::ReportError(format!(
            "file already exists: {}. Please set `overwrite` to true in the file configuration and rerun.",
            path.display()
        )));
    }
    Ok(File::create(path)?)
}

/// Writes one CSV row per simulated day with the state counts after that day's pipeline.
pub struct CountsReport {
    writer: Writer<File>,
}

impl CountsReport {
    /// Creates `<output_dir>/<file_prefix>counts.csv`.
    ///
    /// # Errors
    ///
    /// Returns `PandemicError::ReportError` if the file exists and `overwrite` is not set, or
    /// an I/O error if it cannot be created.
    pub fn create(options: &ReportOptions) -> Result<CountsReport, PandemicError> {
        let path = options.path_for(COUNTS_REPORT_NAME);
        let file = create_report_file(&path, options.overwrite)?;
        info!("writing counts report to {}", path.display());
        Ok(CountsReport {
            writer: Writer::from_writer(file),
        })
    }
}

impl DayObserver for CountsReport {
    fn day_finished(&mut self, context: &SimulationContext) -> Result<(), PandemicError> {
        let item = CountsReportItem::new(context.current_day(), context.counts());
        trace!("counts report: {:?}", item);
        self.writer.serialize(item)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Prints the final counts and the observed rates of the run.
pub fn print_results(counts: StatusCounts, statistics: RunStatistics) {
    println!("━━━━ Final Results ━━━━");
    println!("{:<25}{}", "Total people:", counts.total());
    println!("{:<25}{}", "Susceptible:", counts.susceptible);
    println!("{:<25}{}", "Infected:", counts.infected);
    println!("{:<25}{}", "Immune:", counts.immune);
    println!("{:<25}{}", "Dead:", counts.dead);
    println!("{:<25}{}", "Infection attempts:", statistics.infection_attempts);
    println!("{:<25}{}", "Infections:", statistics.infections);
    println!("{:<25}{}", "Deaths:", statistics.deaths);
    println!(
        "{:<25}{:.2}%",
        "Actual contagiousness:",
        statistics.actual_contagiousness()
    );
    println!(
        "{:<25}{:.2}%",
        "Actual deadliness:",
        statistics.actual_deadliness()
    );
}
