//! Driver construction from a platform description.
//!
//! This module assembles a complete [`Driver`] from run plusargs and a [`PlatformConfig`]:
//! 1. **Validation:** Single-instance widgets are checked before anything is built.
//! 2. **Memory models:** One `TimingModel` per slot, each in the next address window and
//!    writing `memory_stats<N>.csv` into the output directory.
//! 3. **Endpoints:** Assertion (if configured), print (if configured), then the test
//!    harness, which is always present.

use tracing::debug;

use crate::common::constants::PLUSARG_MEMORY_MODEL_PREFIX;
use crate::common::{DriverError, Result};
use crate::config::{PlatformConfig, PlusArgs, RunConfig};
use crate::endpoints::{AssertionEndpoint, PrintEndpoint, TestHarness};
use crate::models::TimingModel;
use crate::sim::Driver;
use crate::simif::Simif;

/// Name of the statistics file for memory model `index`.
pub fn stats_file_name(index: usize) -> String {
    format!("memory_stats{index}.csv")
}

/// Fails on the first `+mm_` plusarg that names no write register of any memory model.
fn check_register_args(platform: &PlatformConfig, plusargs: &PlusArgs) -> Result<()> {
    for (name, _) in plusargs.with_prefix(PLUSARG_MEMORY_MODEL_PREFIX) {
        let known = platform
            .memory_models
            .iter()
            .any(|m| m.write_registers.iter().any(|r| r.name == name));
        if !known {
            return Err(DriverError::UnknownRegister(name.to_string()));
        }
    }
    Ok(())
}

/// Builds a driver for `platform` on `simif`, configured by the plusargs in `args`.
///
/// # Errors
///
/// * [`DriverError::DuplicateWidget`] if the platform has two assertion or two print
///   widgets.
/// * [`DriverError::InvalidPlusArg`] for malformed run, memory-model, or print plusargs.
/// * [`DriverError::UnknownRegister`] if a `+mm_` plusarg matches no memory model's write
///   register.
/// * Window allocation and memory-model construction errors.
/// * [`DriverError::File`] if the print capture file cannot be created.
pub fn build_driver<S, A>(args: &[A], platform: &PlatformConfig, simif: S) -> Result<Driver<S>>
where
    S: Simif + 'static,
    A: AsRef<str>,
{
    platform.validate()?;
    let config = RunConfig::from_args(args)?;
    let plusargs = PlusArgs::new(args.iter().map(|a| a.as_ref().to_string()));
    check_register_args(platform, &plusargs)?;
    let mut driver = Driver::new(config, simif);

    for (index, slot) in platform.memory_models.iter().enumerate() {
        let window = driver.allocate_window(slot.target_addr_bits)?;
        let stats_path = platform.output_dir.join(stats_file_name(index));
        debug!(model = %slot.name, index, base = window.base, size = window.size, "memory model window");
        let model = TimingModel::new(slot, window, &plusargs, stats_path)?;
        driver.add_memory_model(Box::new(model));
    }

    if let Some(assertions) = platform.assertion() {
        driver.add_endpoint(Box::new(AssertionEndpoint::new(assertions)));
    }
    if let Some(prints) = platform.print() {
        driver.add_print_endpoint(Box::new(PrintEndpoint::new(prints, &plusargs)?))?;
    }
    driver.add_endpoint(Box::new(TestHarness::new(&platform.test_harness)));

    Ok(driver)
}
