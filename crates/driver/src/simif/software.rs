//! Software simulation substrate.
//!
//! `SoftwareSimif` runs a [`TargetDesign`] one target cycle at a time on the host CPU.
//! It models the substrate behavior the driver relies on:
//! 1. **Host memory:** A sparse map of 32-bit registers plus a DRAM byte buffer.
//! 2. **Stepping:** `step` schedules cycles; each `done` poll that finds the step
//!    unfinished advances exactly one, so the caller observes every cycle.
//! 3. **Cost model:** Every target cycle costs a fixed number of host cycles.
//! 4. **Budget:** `largest_step_size` never crosses the cycle budget, so the timeout
//!    fires exactly at `max_cycles`.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use tracing::{debug, trace};

use crate::config::HostConfig;
use crate::simif::Simif;

/// Sparse host register space; unwritten registers read as zero.
#[derive(Debug, Clone, Default)]
pub struct HostMemory {
    regs: HashMap<u64, u32>,
}

impl HostMemory {
    /// Creates an empty register space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the register at `addr`.
    #[inline]
    pub fn read(&self, addr: u64) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    /// Writes the register at `addr`.
    #[inline]
    pub fn write(&mut self, addr: u64, data: u32) {
        let _ = self.regs.insert(addr, data);
    }

    /// Adds `delta` to the register at `addr` (wrapping).
    pub fn bump(&mut self, addr: u64, delta: u32) {
        let reg = self.regs.entry(addr).or_insert(0);
        *reg = reg.wrapping_add(delta);
    }
}

/// Target-visible state the design operates on.
#[derive(Debug, Clone)]
pub struct TargetState {
    /// Register space shared with the host.
    pub mmio: HostMemory,
    /// Target DRAM.
    pub dram: Vec<u8>,
}

impl TargetState {
    /// Creates a state with an empty register space and `dram_bytes` of zeroed DRAM.
    pub fn new(dram_bytes: usize) -> Self {
        Self {
            mmio: HostMemory::new(),
            dram: vec![0; dram_bytes],
        }
    }

    /// Writes a little-endian word into DRAM; out-of-range writes are dropped.
    pub fn write_dram_u64(&mut self, addr: u64, val: u64) {
        let idx = addr as usize;
        if let Some(slot) = self.dram.get_mut(idx..idx.saturating_add(8)) {
            slot.copy_from_slice(&val.to_le_bytes());
        }
    }

    /// Reads a little-endian word from DRAM; out-of-range reads return zero.
    pub fn read_dram_u64(&self, addr: u64) -> u64 {
        let idx = addr as usize;
        self.dram
            .get(idx..idx.saturating_add(8))
            .and_then(|b| b.try_into().ok())
            .map_or(0, u64::from_le_bytes)
    }
}

/// A target design evaluated by the software substrate.
pub trait TargetDesign {
    /// Returns the design to its reset state. Register and DRAM contents are left alone.
    fn reset(&mut self, state: &mut TargetState);
    /// Evaluates one target cycle. `tcycle` is the index of the cycle being evaluated.
    fn cycle(&mut self, tcycle: u64, state: &mut TargetState);
}

/// Substrate that evaluates a [`TargetDesign`] in software.
pub struct SoftwareSimif {
    state: TargetState,
    design: Box<dyn TargetDesign>,
    tcycle: u64,
    hcycle: u64,
    pending: u64,
    step_size: u64,
    host_cycles_per_target: u64,
    max_cycles: Option<u64>,
    epoch: Instant,
}

impl fmt::Debug for SoftwareSimif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareSimif")
            .field("tcycle", &self.tcycle)
            .field("hcycle", &self.hcycle)
            .field("pending", &self.pending)
            .field("step_size", &self.step_size)
            .field("max_cycles", &self.max_cycles)
            .finish_non_exhaustive()
    }
}

impl SoftwareSimif {
    /// Creates a substrate for `design` using the given host settings.
    ///
    /// A zero `step_size` is raised to one so the run can always make progress.
    pub fn new(config: &HostConfig, design: Box<dyn TargetDesign>) -> Self {
        Self {
            state: TargetState::new(config.dram_bytes),
            design,
            tcycle: 0,
            hcycle: 0,
            pending: 0,
            step_size: config.step_size.max(1),
            host_cycles_per_target: config.host_cycles_per_target,
            max_cycles: None,
            epoch: Instant::now(),
        }
    }

    /// Target-visible state (for inspection after a run).
    pub const fn state(&self) -> &TargetState {
        &self.state
    }

    /// Mutable target-visible state.
    pub const fn state_mut(&mut self) -> &mut TargetState {
        &mut self.state
    }

    /// Cycles of the current step that have not run yet.
    pub const fn pending(&self) -> u64 {
        self.pending
    }

    fn advance(&mut self) {
        self.design.cycle(self.tcycle, &mut self.state);
        self.tcycle += 1;
        self.hcycle += self.host_cycles_per_target;
    }

    fn advance_idle(&mut self) {
        self.tcycle += 1;
        self.hcycle += self.host_cycles_per_target;
    }
}

impl Simif for SoftwareSimif {
    fn read(&mut self, addr: u64) -> u32 {
        self.state.mmio.read(addr)
    }

    fn write(&mut self, addr: u64, data: u32) {
        self.state.mmio.write(addr, data);
    }

    fn step(&mut self, n: u64, blocking: bool) {
        trace!(cycles = n, blocking, tcycle = self.tcycle, "step");
        self.pending = n;
        if blocking {
            while self.pending > 0 {
                self.advance();
                self.pending -= 1;
            }
        }
    }

    fn done(&mut self) -> bool {
        if self.pending == 0 {
            return true;
        }
        self.advance();
        self.pending -= 1;
        false
    }

    fn largest_step_size(&self) -> u64 {
        self.max_cycles.map_or(self.step_size, |max| {
            self.step_size.min(max.saturating_sub(self.tcycle))
        })
    }

    fn hcycle(&self) -> u64 {
        self.hcycle
    }

    fn actual_tcycle(&self) -> u64 {
        self.tcycle
    }

    fn set_cycle_budget(&mut self, max_cycles: Option<u64>) {
        self.max_cycles = max_cycles;
    }

    fn has_timed_out(&self) -> bool {
        self.max_cycles.is_some_and(|max| self.tcycle >= max)
    }

    fn target_reset(&mut self, start: u64, duration: u64) {
        debug!(start, duration, "asserting target reset");
        while self.tcycle < start {
            self.advance();
        }
        self.design.reset(&mut self.state);
        for _ in 0..duration {
            self.advance_idle();
        }
    }

    fn zero_out_dram(&mut self) {
        self.state.dram.fill(0);
    }

    fn timestamp(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn diff_secs(&self, end: u64, start: u64) -> f64 {
        end.saturating_sub(start) as f64 / 1e9
    }
}
