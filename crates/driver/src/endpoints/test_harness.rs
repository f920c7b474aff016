//! Test-harness endpoint.
//!
//! Every platform has exactly one. It watches the target's DONE register and, once it is
//! set, latches the ERROR register as the run's exit code.
//!
//! # Registers
//!
//! * `0x00`: DONE (nonzero once the target has finished)
//! * `0x04`: ERROR (0 = pass)

use tracing::info;

use crate::common::constants::{HARNESS_DONE, HARNESS_ERROR};
use crate::config::TestHarnessConfig;
use crate::endpoints::Endpoint;
use crate::simif::Simif;

/// Test-harness endpoint.
#[derive(Debug, Clone)]
pub struct TestHarness {
    base: u64,
    done: bool,
    error: u32,
}

impl TestHarness {
    /// Creates the harness for the register block described by `config`.
    pub const fn new(config: &TestHarnessConfig) -> Self {
        Self {
            base: config.base,
            done: false,
            error: 0,
        }
    }
}

impl Endpoint for TestHarness {
    fn name(&self) -> &str {
        "test_harness"
    }

    fn tick(&mut self, sim: &mut dyn Simif) {
        if self.done || sim.read(self.base + HARNESS_DONE) == 0 {
            return;
        }
        self.error = sim.read(self.base + HARNESS_ERROR);
        self.done = true;
        info!(
            error = self.error,
            cycle = sim.actual_tcycle(),
            "target signalled done"
        );
    }

    fn terminate(&self) -> bool {
        self.done
    }

    fn exit_code(&self) -> i32 {
        self.error as i32
    }
}
