//! Memory models.
//!
//! A memory model emulates the timing of an external memory subsystem as seen by the
//! target. The driver does not know how; it only configures each model at init, samples it
//! periodically, and finalizes it. This module provides:
//! 1. **Trait:** The [`MemoryModel`] capability consumed by the driver.
//! 2. **Address maps:** Named read/write register offsets inside a model's window.
//! 3. **Timing model:** A register-mapped model with CSV statistics readback.

/// Named register address maps.
pub mod address_map;

/// Register-mapped timing model.
pub mod timing;

pub use address_map::AddressMap;
pub use timing::TimingModel;

use crate::common::{AddressWindow, Result};
use crate::simif::Simif;

/// Capability shared by every memory model.
pub trait MemoryModel {
    /// Model name used in logs and errors.
    fn name(&self) -> &str;
    /// The host address window owned by this model.
    fn window(&self) -> AddressWindow;
    /// Programs the model's configuration registers. Called before any endpoint init.
    fn init(&mut self, sim: &mut dyn Simif) -> Result<()>;
    /// Samples the model's statistics.
    fn profile(&mut self, sim: &mut dyn Simif) -> Result<()>;
    /// Final sample and cleanup after a successful run.
    fn finish(&mut self, sim: &mut dyn Simif) -> Result<()>;
}
