//! The day progress bar redraws the current console line in place. A log message written
//! while the bar is visible would otherwise leave the tail of the bar behind it.

use log::Record;
use log4rs::encode::{Encode, Write};

/// ANSI escape sequence: erase the whole line, then carriage return.
const CLEAR_LINE: &[u8] = b"\x1B[2K\r";

/// Wraps another encoder and clears the current line before every record.
#[derive(Debug)]
pub struct PBWrapperEncoder {
    inner: Box<dyn Encode>,
}

impl PBWrapperEncoder {
    pub fn new(inner: Box<dyn Encode>) -> Self {
        Self { inner }
    }
}

impl Encode for PBWrapperEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> Result<(), anyhow::Error> {
        w.write_all(CLEAR_LINE)?;
        self.inner.encode(w, record)
    }
}
