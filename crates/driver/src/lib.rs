//! Host-side driver for cycle-accurate memory-model co-simulation.
//!
//! This crate runs a target design on a simulation substrate and coordinates the
//! components that observe or drive it. It provides:
//! 1. **Driver:** The polling loop that steps the target and pumps endpoints, plus the
//!    pass/fail verdict and performance report.
//! 2. **Endpoints:** Assertion, print-capture, and test-harness endpoints behind one trait.
//! 3. **Memory models:** Register-mapped models with disjoint host address windows and
//!    CSV statistics readback.
//! 4. **Substrate:** The `Simif` trait and a software implementation hosting a target design.
//! 5. **Configuration:** Plusarg run flags and a JSON platform description.

/// Common types (address windows, constants, errors).
pub mod common;
/// Run flags and platform configuration.
pub mod config;
/// Endpoint trait and the assertion, print, and test-harness endpoints.
pub mod endpoints;
/// Memory model trait, register address maps, and the register-mapped timing model.
pub mod models;
/// Driver, scheduled-task registry, and platform builder.
pub mod sim;
/// Simulation substrate trait and the software substrate.
pub mod simif;
/// End-of-run verdict and performance report.
pub mod stats;

/// Error type shared by every fallible driver operation.
pub use crate::common::DriverError;
/// Run flags parsed from plusargs.
pub use crate::config::{PlatformConfig, RunConfig};
/// Top-level driver; build with `sim::build_driver` or assemble by hand.
pub use crate::sim::Driver;
/// Substrate trait and the software substrate.
pub use crate::simif::{Simif, SoftwareSimif};
/// Outcome of a completed run.
pub use crate::stats::{RunReport, Verdict};
