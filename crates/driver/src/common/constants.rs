//! Driver-wide constants.
//!
//! This module defines the constants shared by the driver and its components. It includes:
//! 1. **Reset Constants:** When and for how long the target is held in reset.
//! 2. **Plusarg Names:** The run flags recognized on the command line.
//! 3. **Register Offsets:** MMIO layouts of the assertion, print, and test-harness blocks.

/// Target cycle at which reset is asserted.
pub const RESET_START_CYCLE: u64 = 0;

/// Number of target cycles reset is held.
pub const RESET_CYCLES: u64 = 50;

/// Plusarg setting the target-cycle budget (`-1` = unlimited).
pub const PLUSARG_MAX_CYCLES: &str = "+max-cycles=";

/// Plusarg setting the profiling period in cycles (`-1` = disabled).
pub const PLUSARG_PROFILE_INTERVAL: &str = "+profile-interval=";

/// Plusarg requesting that target DRAM be cleared before reset.
pub const PLUSARG_ZERO_OUT_DRAM: &str = "+zero-out-dram";

/// Prefix of plusargs that set memory-model write registers (`+mm_<name>=<value>`).
pub const PLUSARG_MEMORY_MODEL_PREFIX: &str = "+mm_";

/// Plusarg naming the file that receives captured prints.
pub const PLUSARG_PRINT_FILE: &str = "+print-file=";

/// Plusarg setting the first cycle at which prints are captured.
pub const PLUSARG_PRINT_START: &str = "+print-start=";

/// Plusarg setting the last cycle at which prints are captured.
pub const PLUSARG_PRINT_END: &str = "+print-end=";

/// Assertion block: nonzero while an assertion is firing.
pub const ASSERT_FIRE: u64 = 0x00;
/// Assertion block: index of the firing assertion.
pub const ASSERT_ID: u64 = 0x04;
/// Assertion block: low 32 bits of the cycle the assertion fired.
pub const ASSERT_CYCLE_LO: u64 = 0x08;
/// Assertion block: high 32 bits of the cycle the assertion fired.
pub const ASSERT_CYCLE_HI: u64 = 0x0C;

/// Print block: nonzero while `PRINT_DATA` holds an unread byte.
pub const PRINT_VALID: u64 = 0x00;
/// Print block: the byte being printed.
pub const PRINT_DATA: u64 = 0x04;

/// Test-harness block: nonzero once the target has finished.
pub const HARNESS_DONE: u64 = 0x00;
/// Test-harness block: error code reported by the target (0 = pass).
pub const HARNESS_ERROR: u64 = 0x04;
