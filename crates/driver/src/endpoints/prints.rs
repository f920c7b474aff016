//! Print-capture endpoint.
//!
//! The print widget exposes a one-byte channel: the target sets VALID with a byte in DATA,
//! and the endpoint pops it by clearing VALID. Bytes are buffered and written to the
//! capture sink (`+print-file=<path>` or stdout).
//!
//! Capture can be restricted to a cycle window with `+print-start=<cycle>` and
//! `+print-end=<cycle>`; bytes outside the window are popped and dropped so the target
//! never stalls.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::common::constants::{
    PLUSARG_PRINT_END, PLUSARG_PRINT_FILE, PLUSARG_PRINT_START, PRINT_DATA, PRINT_VALID,
};
use crate::common::{DriverError, Result};
use crate::config::{PlusArgs, PrintConfig};
use crate::endpoints::Endpoint;
use crate::simif::Simif;

/// Buffered bytes that trigger a flush to the sink (4 KiB).
const FLUSH_THRESHOLD: usize = 4096;

/// Print-capture endpoint.
pub struct PrintEndpoint {
    base: u64,
    start: u64,
    end: u64,
    path: Option<PathBuf>,
    sink: Box<dyn Write>,
    buffer: Vec<u8>,
    captured: u64,
    error: Option<io::Error>,
}

impl fmt::Debug for PrintEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintEndpoint")
            .field("base", &self.base)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("path", &self.path)
            .field("captured", &self.captured)
            .finish_non_exhaustive()
    }
}

impl PrintEndpoint {
    /// Creates the endpoint, opening the capture file named by `+print-file=` if present.
    ///
    /// # Errors
    ///
    /// * [`DriverError::InvalidPlusArg`] if `+print-start=` or `+print-end=` is not a number.
    /// * [`DriverError::File`] if the capture file cannot be created.
    pub fn new(config: &PrintConfig, args: &PlusArgs) -> Result<Self> {
        let path = args.value(PLUSARG_PRINT_FILE).map(PathBuf::from);
        let sink: Box<dyn Write> = match &path {
            Some(p) => Box::new(BufWriter::new(
                File::create(p).map_err(|e| DriverError::file(p, e))?,
            )),
            None => Box::new(io::stdout()),
        };
        let mut endpoint = Self::with_sink(config, sink);
        endpoint.path = path;
        endpoint.start = args.u64_value(PLUSARG_PRINT_START)?.unwrap_or(0);
        endpoint.end = args.u64_value(PLUSARG_PRINT_END)?.unwrap_or(u64::MAX);
        Ok(endpoint)
    }

    /// Creates an endpoint capturing every cycle into `sink`.
    pub fn with_sink(config: &PrintConfig, sink: Box<dyn Write>) -> Self {
        Self {
            base: config.base,
            start: 0,
            end: u64::MAX,
            path: None,
            sink,
            buffer: Vec::with_capacity(FLUSH_THRESHOLD),
            captured: 0,
            error: None,
        }
    }

    /// Restricts capture to target cycles in `start..=end`.
    #[must_use]
    pub const fn with_window(mut self, start: u64, end: u64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Bytes captured so far (inside the window).
    pub const fn captured(&self) -> u64 {
        self.captured
    }

    fn sink_error(&self, e: io::Error) -> DriverError {
        match &self.path {
            Some(p) => DriverError::file(p, e),
            None => DriverError::Io(e),
        }
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.sink.write_all(&self.buffer) {
            warn!(error = %e, "print capture write failed");
            self.error = Some(e);
        }
        self.buffer.clear();
    }
}

impl Endpoint for PrintEndpoint {
    fn name(&self) -> &str {
        "prints"
    }

    fn tick(&mut self, sim: &mut dyn Simif) {
        if sim.read(self.base + PRINT_VALID) == 0 {
            return;
        }
        let byte = sim.read(self.base + PRINT_DATA) as u8;
        sim.write(self.base + PRINT_VALID, 0);

        let cycle = sim.actual_tcycle();
        if cycle < self.start || cycle > self.end {
            return;
        }
        self.buffer.push(byte);
        self.captured += 1;
        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.flush_buffer();
        }
    }

    fn terminate(&self) -> bool {
        false
    }

    fn exit_code(&self) -> i32 {
        0
    }

    fn finish(&mut self, _sim: &mut dyn Simif) -> Result<()> {
        self.flush_buffer();
        if let Some(e) = self.error.take() {
            return Err(self.sink_error(e));
        }
        self.sink.flush().map_err(|e| self.sink_error(e))?;
        debug!(bytes = self.captured, "print capture flushed");
        Ok(())
    }
}
