//! Traffic generator target design.
//!
//! A small stand-in for a real design under test, used by the `fasedsim` binary and by the
//! end-to-end tests. Each cycle it:
//! 1. **Issues traffic:** Every `interval` cycles one transaction goes to the next memory
//!    model, bumping its read or write counters and storing a word in DRAM.
//! 2. **Prints:** Streams its message one byte at a time through the print widget.
//! 3. **Fails on request:** Fires the configured assertion at `fail_at`.
//! 4. **Finishes:** Raises the test-harness DONE register once all work is drained.

use tracing::debug;

use crate::common::WindowAllocator;
use crate::common::constants::{
    ASSERT_CYCLE_HI, ASSERT_CYCLE_LO, ASSERT_FIRE, ASSERT_ID, HARNESS_DONE, HARNESS_ERROR,
    PRINT_DATA, PRINT_VALID,
};
use crate::config::{MemoryModelConfig, PlatformConfig, TrafficConfig};
use crate::simif::software::{TargetDesign, TargetState};

/// Data beats moved by one transaction.
const BEATS_PER_TRANSACTION: u32 = 4;

/// Host addresses of one memory model's traffic counters.
#[derive(Debug, Clone, Copy, Default)]
struct CounterPorts {
    reads: Option<u64>,
    writes: Option<u64>,
    read_beats: Option<u64>,
    write_beats: Option<u64>,
}

impl CounterPorts {
    fn locate(base: u64, model: &MemoryModelConfig) -> Self {
        let find = |name: &str| {
            model
                .read_registers
                .iter()
                .find(|r| r.name == name)
                .map(|r| base.wrapping_add(r.offset))
        };
        Self {
            reads: find("totalReads"),
            writes: find("totalWrites"),
            read_beats: find("totalReadBeats"),
            write_beats: find("totalWriteBeats"),
        }
    }
}

/// Target design that generates memory traffic and drives every widget.
#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    config: TrafficConfig,
    models: Vec<CounterPorts>,
    assert_base: Option<u64>,
    print_base: Option<u64>,
    harness_base: u64,
    issued: u64,
    countdown: u64,
    cursor: usize,
    fired: bool,
    finished: bool,
}

impl TrafficGenerator {
    /// Builds a generator wired to the register layout of `platform`.
    ///
    /// Memory-model windows are recomputed with the same allocator the driver uses, so the
    /// generator and the driver agree on every counter address. Models whose windows cannot
    /// be allocated are skipped; the driver reports that error when it is built.
    pub fn new(platform: &PlatformConfig) -> Self {
        let mut windows = WindowAllocator::new();
        let models = platform
            .memory_models
            .iter()
            .map_while(|m| {
                windows
                    .allocate(m.target_addr_bits)
                    .ok()
                    .map(|w| CounterPorts::locate(w.base, m))
            })
            .collect();
        let interval = platform.traffic.interval.max(1);
        Self {
            config: platform.traffic.clone(),
            models,
            assert_base: platform.assertion().map(|a| a.base),
            print_base: platform.print().map(|p| p.base),
            harness_base: platform.test_harness.base,
            issued: 0,
            countdown: interval,
            cursor: 0,
            fired: false,
            finished: false,
        }
    }

    /// Transactions issued since the last reset.
    pub const fn issued(&self) -> u64 {
        self.issued
    }

    /// Returns `true` once DONE has been raised.
    pub const fn finished(&self) -> bool {
        self.finished
    }

    fn interval(&self) -> u64 {
        self.config.interval.max(1)
    }

    fn issue(&mut self, state: &mut TargetState) {
        let n = self.issued;
        if let Some(ports) = self.models.get(n as usize % self.models.len().max(1)) {
            let (count, beats) = if n % 2 == 0 {
                (ports.reads, ports.read_beats)
            } else {
                (ports.writes, ports.write_beats)
            };
            if let Some(addr) = count {
                state.mmio.bump(addr, 1);
            }
            if let Some(addr) = beats {
                state.mmio.bump(addr, BEATS_PER_TRANSACTION);
            }
        }
        let len = state.dram.len() as u64;
        if len >= 8 {
            state.write_dram_u64((n * 8) % (len - len % 8), n);
        }
        self.issued += 1;
    }

    fn pump_print(&mut self, state: &mut TargetState) {
        let Some(base) = self.print_base else {
            self.cursor = self.config.message.len();
            return;
        };
        if self.cursor >= self.config.message.len() || state.mmio.read(base + PRINT_VALID) != 0 {
            return;
        }
        let byte = self.config.message.as_bytes()[self.cursor];
        state.mmio.write(base + PRINT_DATA, u32::from(byte));
        state.mmio.write(base + PRINT_VALID, 1);
        self.cursor += 1;
    }

    fn print_drained(&self, state: &TargetState) -> bool {
        self.cursor >= self.config.message.len()
            && self
                .print_base
                .is_none_or(|base| state.mmio.read(base + PRINT_VALID) == 0)
    }
}

impl TargetDesign for TrafficGenerator {
    fn reset(&mut self, _state: &mut TargetState) {
        self.issued = 0;
        self.countdown = self.interval();
        self.cursor = 0;
        self.fired = false;
        self.finished = false;
    }

    fn cycle(&mut self, tcycle: u64, state: &mut TargetState) {
        if self.finished {
            return;
        }

        if let (Some(at), Some(base)) = (self.config.fail_at, self.assert_base) {
            if !self.fired && tcycle >= at {
                debug!(tcycle, id = self.config.fail_id, "firing assertion");
                state.mmio.write(base + ASSERT_ID, self.config.fail_id);
                state.mmio.write(base + ASSERT_CYCLE_LO, tcycle as u32);
                state.mmio.write(base + ASSERT_CYCLE_HI, (tcycle >> 32) as u32);
                state.mmio.write(base + ASSERT_FIRE, 1);
                self.fired = true;
            }
        }

        if self.issued < self.config.transactions {
            self.countdown -= 1;
            if self.countdown == 0 {
                self.issue(state);
                self.countdown = self.interval();
            }
        }

        self.pump_print(state);

        if self.issued >= self.config.transactions && self.print_drained(state) {
            debug!(tcycle, issued = self.issued, "traffic complete");
            state.mmio.write(self.harness_base + HARNESS_ERROR, 0);
            state.mmio.write(self.harness_base + HARNESS_DONE, 1);
            self.finished = true;
        }
    }
}
