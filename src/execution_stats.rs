//! Run-time instrumentation: wall time spent in each stage of the day pipeline, and process
//! level CPU time and memory use for the whole run.

// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::time::{Duration, Instant};

use bytesize::ByteSize;
use humantime::format_duration;
use log::{debug, error, info};
use serde_derive::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::stages::Stage;

/// How frequently we update the max memory used value.
const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Accumulated wall time and number of runs of each pipeline stage.
#[derive(Clone, Debug, Default)]
pub struct StageTimings {
    totals: [Duration; Stage::ALL.len()],
    calls: [usize; Stage::ALL.len()],
}

impl StageTimings {
    pub(crate) fn record(&mut self, stage: Stage, elapsed: Duration) {
        self.totals[stage.index()] += elapsed;
        self.calls[stage.index()] += 1;
    }

    pub fn total(&self, stage: Stage) -> Duration {
        self.totals[stage.index()]
    }

    pub fn calls(&self, stage: Stage) -> usize {
        self.calls[stage.index()]
    }

    /// Sum over all stages.
    pub fn pipeline_total(&self) -> Duration {
        self.totals.iter().sum()
    }
}

/// Prints the accumulated stage timings to the console.
pub fn print_stage_timings(timings: &StageTimings) {
    println!("━━━━ Stage Timings ━━━━");
    for stage in Stage::ALL {
        println!(
            "{:<25}{}",
            format!("{}:", capitalize(stage.name())),
            format_duration(timings.total(stage))
        );
    }
    println!(
        "{:<25}{}",
        "Pipeline total:",
        format_duration(timings.pipeline_total())
    );
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A container struct for computed final statistics. Note that if population size
/// is zero, then the per person statistics are also zero, as they are meaningless.
#[derive(Serialize)]
pub struct ExecutionStatistics {
    pub max_memory_usage: u64,
    pub cpu_time: Duration,
    pub wall_time: Duration,

    // Per person stats
    pub population: usize,
    pub cpu_time_per_person: Duration,
    pub wall_time_per_person: Duration,
    pub memory_per_person: u64,
}

pub struct ExecutionProfilingCollector {
    /// Run start time, used to compute elapsed wall time
    start_time: Instant,
    /// We keep track of the last time we refreshed so that client code doesn't have to and can
    /// just call `ExecutionProfilingCollector::refresh` once per day.
    last_refresh: Instant,
    /// The accumulated CPU time of the process in CPU-milliseconds at run start
    start_cpu_time: u64,
    /// The maximum amount of real memory used by the process as reported by
    /// `sysinfo::System::process::memory()`. This value is polled during execution to capture the
    /// max.
    max_memory_usage: u64,
    /// A `sysinfo::System` for polling memory use
    system: System,
    /// Current process, set to `None` on unsupported platforms
    process_id: Option<Pid>,
}

impl Default for ExecutionProfilingCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionProfilingCollector {
    pub fn new() -> ExecutionProfilingCollector {
        let process_id = sysinfo::get_current_pid().ok();
        let now = Instant::now();

        let mut new_stats = ExecutionProfilingCollector {
            start_time: now,
            last_refresh: now,
            start_cpu_time: 0,
            max_memory_usage: 0,
            system: System::new(),
            process_id,
        };
        if let Some(process_id) = process_id {
            debug!("Process ID: {}", process_id);
            let process_refresh_kind = ProcessRefreshKind::nothing().with_cpu().with_memory();
            new_stats.update_system_info(process_refresh_kind);

            if let Some(process) = new_stats.system.process(process_id) {
                new_stats.max_memory_usage = process.memory();
                new_stats.start_cpu_time = process.accumulated_cpu_time();
            }
        }

        new_stats
    }

    /// If at least `REFRESH_INTERVAL` (1 second) has passed since the previous
    /// refresh, memory usage is polled and updated. Call this method as frequently
    /// as you like, as it takes care of limiting polling frequency itself.
    #[inline]
    pub fn refresh(&mut self) {
        if self.last_refresh.elapsed() >= REFRESH_INTERVAL {
            self.poll_memory();
            self.last_refresh = Instant::now();
        }
    }

    fn poll_memory(&mut self) {
        if let Some(pid) = self.process_id {
            self.update_system_info(ProcessRefreshKind::nothing().with_memory());
            if let Some(process) = self.system.process(pid) {
                self.max_memory_usage = self.max_memory_usage.max(process.memory());
            }
        }
    }

    #[inline]
    fn update_system_info(&mut self, process_refresh_kind: ProcessRefreshKind) {
        if let Some(pid) = self.process_id {
            if self.system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                process_refresh_kind,
            ) < 1
            {
                error!("could not refresh process statistics");
            }
        }
    }

    /// Computes the final summary statistics
    pub fn compute_final_statistics(&mut self, population: usize) -> ExecutionStatistics {
        let mut cpu_time_millis = 0;

        if let Some(pid) = self.process_id {
            self.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
            if let Some(process) = self.system.process(pid) {
                self.max_memory_usage = self.max_memory_usage.max(process.memory());
                cpu_time_millis = process
                    .accumulated_cpu_time()
                    .saturating_sub(self.start_cpu_time);
            }
        }

        let cpu_time = Duration::from_millis(cpu_time_millis);
        let wall_time = self.start_time.elapsed();

        let cpu_time_per_person = if population > 0 {
            Duration::from_secs_f64(cpu_time_millis as f64 / population as f64 / 1000.0)
        } else {
            Duration::new(0, 0)
        };
        let wall_time_per_person = if population > 0 {
            Duration::from_secs_f64(wall_time.as_secs_f64() / population as f64)
        } else {
            Duration::new(0, 0)
        };
        let memory_per_person = if population > 0 {
            self.max_memory_usage / population as u64
        } else {
            0
        };

        ExecutionStatistics {
            max_memory_usage: self.max_memory_usage,
            cpu_time,
            wall_time,
            population,
            cpu_time_per_person,
            wall_time_per_person,
            memory_per_person,
        }
    }
}

/// Prints execution statistics to the console.
///
/// Use `ExecutionProfilingCollector::compute_final_statistics()` to construct `ExecutionStatistics`.
pub fn print_execution_statistics(summary: &ExecutionStatistics) {
    println!("━━━━ Execution Summary ━━━━");
    if summary.max_memory_usage == 0 {
        println!("Memory and CPU statistics are not available on your platform.");
    } else {
        println!(
            "{:<25}{}",
            "Max memory usage:",
            ByteSize::b(summary.max_memory_usage)
        );
        println!("{:<25}{}", "CPU time:", format_duration(summary.cpu_time));
    }

    println!("{:<25}{}", "Wall time:", format_duration(summary.wall_time));

    if summary.population > 0 {
        println!("{:<25}{}", "Population:", summary.population);
        if summary.max_memory_usage > 0 {
            println!(
                "{:<25}{}",
                "Memory per person:",
                ByteSize::b(summary.memory_per_person)
            );
            println!(
                "{:<25}{}",
                "CPU time per person:",
                format_duration(summary.cpu_time_per_person)
            );
        }
        println!(
            "{:<25}{}",
            "Wall time per person:",
            format_duration(summary.wall_time_per_person)
        );
    }
}

/// Logs execution statistics with the logging system.
pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("Execution complete.");
    if stats.max_memory_usage > 0 {
        info!("Max memory usage: {}", ByteSize::b(stats.max_memory_usage));
        info!("CPU time: {}", format_duration(stats.cpu_time));
    }
    info!("Wall time: {}", format_duration(stats.wall_time));
}
