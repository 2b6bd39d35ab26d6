//! Used when the crate is built without the `logging` feature. Nothing is written anywhere,
//! but the public API of `crate::log` keeps working.

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Only adjusts the `log` crate's max level so disabled macros stay cheap.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
