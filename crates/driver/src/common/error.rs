//! Driver error type.
//!
//! Failures of the *target* are not errors: they are reported through endpoint exit codes
//! and the run verdict. `DriverError` covers everything else that can stop the host side:
//! 1. **Configuration:** Malformed plusargs, invalid platform descriptions, duplicate widgets.
//! 2. **Construction:** Address-space exhaustion and unknown or unset registers.
//! 3. **I/O:** Statistics and print capture files.
//! 4. **Fatal verdict:** A nonzero endpoint exit code after the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for results returned by the driver.
pub type Result<T, E = DriverError> = std::result::Result<T, E>;

/// Errors raised by the host-side driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A recognized plusarg carried a value that is not a valid number for it.
    #[error("invalid value `{value}` for plusarg `{flag}`")]
    InvalidPlusArg {
        /// The plusarg prefix, e.g. `+max-cycles=`.
        flag: &'static str,
        /// The offending value.
        value: String,
    },

    /// More than one widget of a single-instance kind was configured.
    #[error("at most one {0} widget may be configured")]
    DuplicateWidget(&'static str),

    /// A memory-model write register has neither a plusarg value nor a default.
    #[error("memory model `{model}`: no value for write register `{register}` (pass +mm_{register}=<value>)")]
    MissingRegisterValue {
        /// Model name.
        model: String,
        /// Register name.
        register: String,
    },

    /// A `+mm_` plusarg names a register that no memory model writes.
    #[error("no memory model has a write register named `{0}`")]
    UnknownRegister(String),

    /// An address window was requested with a width that does not fit in 64 bits.
    #[error("address window width of {0} bits exceeds the 64-bit host address space")]
    InvalidWindowWidth(u32),

    /// Memory-model windows no longer fit in the host address space.
    #[error("host address space exhausted: requested {requested:#x} bytes, {remaining:#x} left")]
    AddressSpaceExhausted {
        /// Requested window size.
        requested: u64,
        /// Bytes still available.
        remaining: u64,
    },

    /// The platform description could not be parsed.
    #[error("invalid platform configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A file the driver reads or writes could not be accessed.
    #[error("{path}: {source}")]
    File {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// An I/O error on a stream (diagnostic sink, stdout).
    #[error(transparent)]
    Io(#[from] io::Error),

    /// An endpoint reported a nonzero exit code; the run is fatal.
    #[error("endpoint failure (code = {code}) after {cycle} cycles")]
    AssertionFailed {
        /// First nonzero endpoint exit code.
        code: i32,
        /// Target cycle at which the run ended.
        cycle: u64,
    },
}

impl DriverError {
    /// Wraps an I/O error with the path of the file it concerns.
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error: the endpoint code for a fatal verdict, else 1.
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::AssertionFailed { code, .. } => *code,
            _ => 1,
        }
    }
}
