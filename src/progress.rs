//! A progress bar that tracks simulated days.
//!
//! The bar is opt-in: call [`init_day_progress_bar`] before executing the simulation and the
//! context advances it after every completed day. Log messages written while the bar is
//! visible clear the current line first (see `crate::log`), so the two can be used together.
//!
//! ```ignore
//! init_day_progress_bar(parameters.total_days);
//! context.execute()?;
//! ```

use std::sync::OnceLock;

use progress_bar::{
    finalize_progress_bar, inc_progress_bar, init_progress_bar, set_progress_bar_action, Color,
    Style,
};

use crate::log::trace;

/// Number of days the bar was initialized with. Unset until `init_day_progress_bar` is called.
static DAY_COUNT: OnceLock<usize> = OnceLock::new();

/// Initializes the progress bar for a run whose last day index is `total_days`.
///
/// Note: Only the first call has an effect.
pub fn init_day_progress_bar(total_days: u32) {
    let day_count = total_days as usize + 1;
    if DAY_COUNT.set(day_count).is_err() {
        trace!("day progress bar already initialized");
        return;
    }
    trace!("initializing day progress bar with {} days", day_count);
    init_progress_bar(day_count);
    set_progress_bar_action("Day", Color::Blue, Style::Bold);
}

/// Advances the bar by one day. Does nothing if the bar was never initialized.
pub(crate) fn increment_day_progress() {
    if DAY_COUNT.get().is_some() {
        inc_progress_bar();
    }
}

/// Finishes the bar and moves the cursor to a fresh line.
pub fn finish_day_progress() {
    if DAY_COUNT.get().is_some() {
        finalize_progress_bar();
    }
}
