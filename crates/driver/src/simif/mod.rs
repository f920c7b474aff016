//! Simulation substrate interface.
//!
//! The substrate is whatever actually advances the target clock: an FPGA behind a host
//! link, an RTL simulator, or the software model in [`software`]. The driver only ever
//! talks to it through the [`Simif`] trait, which provides:
//! 1. **MMIO:** 32-bit register reads and writes into the flat host address space.
//! 2. **Stepping:** Non-blocking `step` requests polled to completion with `done`.
//! 3. **Counters:** Host and target cycle counters and the cycle-budget timeout.
//! 4. **Control:** Target reset and bulk DRAM clear.
//! 5. **Time:** Opaque timestamps and their difference in seconds.

/// Software substrate and its target-design hook.
pub mod software;

/// Demo target design that exercises every endpoint.
pub mod traffic;

pub use software::{HostMemory, SoftwareSimif, TargetDesign, TargetState};
pub use traffic::TrafficGenerator;

/// Interface to the simulation substrate.
pub trait Simif {
    /// Reads the 32-bit register at host address `addr`.
    fn read(&mut self, addr: u64) -> u32;
    /// Writes the 32-bit register at host address `addr`.
    fn write(&mut self, addr: u64, data: u32);

    /// Requests that the target advance `n` cycles.
    ///
    /// With `blocking` the call returns once all cycles have run; otherwise completion is
    /// observed by polling [`done`](Self::done).
    fn step(&mut self, n: u64, blocking: bool);
    /// Returns `true` once the last requested step has fully completed.
    fn done(&mut self) -> bool;
    /// Largest step the substrate can currently take without overrunning its budget.
    fn largest_step_size(&self) -> u64;

    /// Host cycles elapsed since the substrate was created.
    fn hcycle(&self) -> u64;
    /// Target cycles elapsed, including reset.
    fn actual_tcycle(&self) -> u64;
    /// Sets the target-cycle budget used by [`has_timed_out`](Self::has_timed_out).
    fn set_cycle_budget(&mut self, max_cycles: Option<u64>);
    /// Returns `true` once the target-cycle budget is exhausted.
    fn has_timed_out(&self) -> bool;

    /// Holds the target in reset for `duration` cycles starting at cycle `start`.
    fn target_reset(&mut self, start: u64, duration: u64);
    /// Clears all of target DRAM.
    fn zero_out_dram(&mut self);

    /// Opaque wall-clock timestamp.
    fn timestamp(&self) -> u64;
    /// Seconds between two timestamps taken with [`timestamp`](Self::timestamp).
    fn diff_secs(&self, end: u64, start: u64) -> f64;
}
