use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Command, FromArgMatches as _};

use crate::context::SimulationContext;
use crate::display::{DisplayMode, TextDisplay};
use crate::error::PandemicError;
use crate::execution_stats::{
    log_execution_statistics, print_execution_statistics, print_stage_timings,
};
use crate::log::{apply_log_spec, info, LogSpec};
use crate::parameters::Parameters;
use crate::report::{print_results, CountsReport, ReportOptions};

/// Command line arguments of the `pandemic` binary.
///
/// The single-letter flags are the ones the simulation has always used. `-h` sets the height,
/// so help is only available as `--help`.
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Number of people
    #[arg(short = 'n', long)]
    pub population: Option<usize>,

    /// Number of initially infected people
    #[arg(short = 'i', long)]
    pub initial_infections: Option<usize>,

    /// Width of the environment
    #[arg(short = 'w', long)]
    pub width: Option<u32>,

    /// Height of the environment
    #[arg(short = 'h', long)]
    pub height: Option<u32>,

    /// Last day to simulate
    #[arg(short = 't', long)]
    pub total_days: Option<u32>,

    /// Days an infection lasts
    #[arg(short = 'T', long)]
    pub disease_duration: Option<u32>,

    /// Contagiousness, in percent
    #[arg(short = 'c', long)]
    pub contagiousness: Option<u32>,

    /// Infection radius
    #[arg(short = 'd', long)]
    pub infection_radius: Option<u32>,

    /// Deadliness, in percent
    #[arg(short = 'D', long)]
    pub deadliness: Option<u32>,

    /// Microseconds to pause after each displayed day
    #[arg(short = 'm', long)]
    pub microseconds_per_day: Option<u64>,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 'p', long)]
    pub threads: Option<usize>,

    /// Random seed
    #[arg(long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a JSON parameters file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Optional directory for the per-day counts report. No report is written without it
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Overwrite an existing report
    #[arg(long)]
    pub overwrite: bool,

    /// Enable logging: a default level and/or `module=level` entries, comma separated
    /// (e.g. `info,pandemic::stages=debug`)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Show the grid while the simulation runs
    #[arg(long, value_enum)]
    pub display: Option<DisplayMode>,

    /// Do not print the final results
    #[arg(long)]
    pub no_results: bool,

    /// Print execution statistics and per-stage timings at the end of the run
    #[arg(long)]
    pub timings: bool,

    /// Show a progress bar of simulated days
    #[arg(long)]
    pub progress: bool,
}

fn create_pandemic_cli() -> Command {
    let cli = Command::new("pandemic")
        .about("Simulates the spread of a disease through people moving on a grid")
        .disable_help_flag(true);
    BaseArgs::augment_args(cli)
}

/// Starts from the defaults or the `--config` file and applies the command line overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn build_parameters(args: &BaseArgs) -> Result<Parameters, PandemicError> {
    let mut parameters = match &args.config {
        Some(path) => {
            info!("loading parameters from {}", path.display());
            Parameters::from_json_file(path)?
        }
        None => Parameters::default(),
    };

    macro_rules! apply_override {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = args.$field {
                    parameters.$field = value;
                }
            )*
        };
    }
    apply_override!(
        population,
        initial_infections,
        width,
        height,
        total_days,
        disease_duration,
        contagiousness,
        infection_radius,
        deadliness,
        microseconds_per_day,
        threads,
        display,
    );
    if args.no_results {
        parameters.show_results = false;
    }
    Ok(parameters)
}

/// Runs a simulation with the command line arguments of the current process.
///
/// # Errors
///
/// Returns an error if the arguments or parameters are invalid or the run fails. Argument
/// errors and `--help` are handled by clap, which exits the process.
pub fn run() -> Result<SimulationContext, PandemicError> {
    let matches = create_pandemic_cli().get_matches();
    let args = match BaseArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(error) => error.exit(),
    };
    run_with_args(args)
}

/// Parses `args` (the first item is the program name) and runs a simulation.
///
/// # Errors
///
/// Returns an error if the arguments cannot be parsed or the run fails.
pub fn run_from<I, T>(args: I) -> Result<SimulationContext, PandemicError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = create_pandemic_cli()
        .try_get_matches_from(args)
        .map_err(|e| PandemicError::ConfigError(e.to_string()))?;
    let args = BaseArgs::from_arg_matches(&matches)
        .map_err(|e| PandemicError::ConfigError(e.to_string()))?;
    run_with_args(args)
}

/// Runs a simulation from already parsed arguments.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, the report cannot be created or the run
/// fails.
pub fn run_with_args(args: BaseArgs) -> Result<SimulationContext, PandemicError> {
    if let Some(log_level) = &args.log_level {
        let spec: LogSpec = log_level.parse()?;
        apply_log_spec(&spec);
    }

    let parameters = build_parameters(&args)?;
    let mut context = SimulationContext::new(parameters, args.random_seed)?;

    if let Some(output_dir) = args.output_dir {
        let mut report_options = ReportOptions::new();
        report_options
            .directory(output_dir)
            .file_prefix(args.file_prefix)
            .overwrite(args.overwrite);
        context.add_observer(Box::new(CountsReport::create(&report_options)?));
    }

    let parameters = context.parameters().clone();
    if parameters.display == DisplayMode::Text {
        context.add_observer(Box::new(TextDisplay::stdout(
            parameters.microseconds_per_day,
        )));
    }

    // The bar would be drawn over the text display.
    #[cfg(feature = "progress_bar")]
    let show_progress = args.progress && parameters.display == DisplayMode::None;
    #[cfg(feature = "progress_bar")]
    if show_progress {
        crate::progress::init_day_progress_bar(parameters.total_days);
    }

    context.execute()?;

    #[cfg(feature = "progress_bar")]
    if show_progress {
        crate::progress::finish_day_progress();
    }

    if parameters.show_results {
        print_results(context.counts(), context.statistics());
    }

    let execution_statistics = context.get_execution_statistics();
    log_execution_statistics(&execution_statistics);
    if args.timings {
        print_execution_statistics(&execution_statistics);
        print_stage_timings(context.stage_timings());
    }

    Ok(context)
}
