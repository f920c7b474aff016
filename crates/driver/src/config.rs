//! Configuration for the driver.
//!
//! This module defines the two configuration layers of a run. It provides:
//! 1. **Run flags:** `RunConfig`, parsed from `+flag=value` plusargs on the command line.
//! 2. **Plusarg lookup:** `PlusArgs`, shared by components that take their own plusargs.
//! 3. **Platform:** `PlatformConfig`, the JSON description of which memory models and
//!    widgets are present and how the software substrate and demo design are set up.
//!
//! Every platform field has a default, so `{}` is a complete platform: one memory model,
//! one assertion widget, one print widget, and the test harness.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::constants::{
    PLUSARG_MAX_CYCLES, PLUSARG_PROFILE_INTERVAL, PLUSARG_ZERO_OUT_DRAM,
};
use crate::common::error::{DriverError, Result};

/// Default platform constants.
mod defaults {
    /// Host address space bits of a memory model window (4 GiB).
    pub const TARGET_ADDR_BITS: u32 = 32;

    /// Base of the assertion widget register block.
    pub const ASSERTION_BASE: u64 = 0x0000_1000;

    /// Base of the print widget register block.
    pub const PRINT_BASE: u64 = 0x0000_1100;

    /// Base of the test-harness register block.
    pub const HARNESS_BASE: u64 = 0x0000_1200;

    /// Largest number of target cycles advanced by one `step`.
    pub const STEP_SIZE: u64 = 1024;

    /// Host cycles consumed per target cycle by the software substrate.
    pub const HOST_CYCLES_PER_TARGET: u64 = 4;

    /// Target DRAM size of the software substrate (1 MiB).
    pub const DRAM_BYTES: usize = 1024 * 1024;

    /// Memory transactions issued by the traffic generator.
    pub const TRANSACTIONS: u64 = 64;

    /// Target cycles between two transactions.
    pub const TRANSACTION_INTERVAL: u64 = 8;

    /// Message streamed through the print widget.
    pub const MESSAGE: &str = "fasedtests: traffic complete\n";
}

/// Value of a sentinel-encoded plusarg: `-1` disables it, anything else must be >= 0.
fn parse_sentinel(flag: &'static str, value: &str) -> Result<Option<u64>> {
    match value.trim().parse::<i64>() {
        Ok(-1) => Ok(None),
        Ok(v) if v >= 0 => Ok(Some(v as u64)),
        _ => Err(DriverError::InvalidPlusArg {
            flag,
            value: value.to_string(),
        }),
    }
}

/// Run flags.
///
/// Built once from the process arguments and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunConfig {
    /// Target-cycle budget; `None` runs until an endpoint terminates.
    pub max_cycles: Option<u64>,
    /// Period of the memory-model profiling task; `None` disables it.
    pub profile_interval: Option<u64>,
    /// Clear target DRAM before reset.
    pub zero_out_dram: bool,
}

impl RunConfig {
    /// Parses the recognized run flags out of `args`; everything else is ignored.
    ///
    /// Later occurrences of a flag override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidPlusArg`] if `+max-cycles=` or `+profile-interval=`
    /// carries something other than `-1` or a non-negative integer.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = arg.strip_prefix(PLUSARG_MAX_CYCLES) {
                config.max_cycles = parse_sentinel(PLUSARG_MAX_CYCLES, value)?;
            }
            if let Some(value) = arg.strip_prefix(PLUSARG_PROFILE_INTERVAL) {
                config.profile_interval = parse_sentinel(PLUSARG_PROFILE_INTERVAL, value)?;
            }
            if arg.starts_with(PLUSARG_ZERO_OUT_DRAM) {
                config.zero_out_dram = true;
            }
        }
        Ok(config)
    }
}

/// Read-only view over the process plusargs for components with their own flags.
#[derive(Debug, Clone, Default)]
pub struct PlusArgs {
    args: Vec<String>,
}

impl PlusArgs {
    /// Captures a copy of `args`.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the value of the last `<prefix><value>` argument, if any.
    pub fn value(&self, prefix: &str) -> Option<&str> {
        self.args.iter().rev().find_map(|a| a.strip_prefix(prefix))
    }

    /// Returns `true` if any argument starts with `flag`.
    pub fn has(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a.starts_with(flag))
    }

    /// Parses the last `<prefix><value>` argument as an unsigned integer.
    ///
    /// Accepts decimal or `0x`-prefixed hexadecimal.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidPlusArg`] if the value is present but not a number.
    pub fn u64_value(&self, prefix: &'static str) -> Result<Option<u64>> {
        self.value(prefix)
            .map(|v| {
                parse_u64(v).ok_or_else(|| DriverError::InvalidPlusArg {
                    flag: prefix,
                    value: v.to_string(),
                })
            })
            .transpose()
    }

    /// Iterates over `(name, value)` pairs of every `<prefix><name>=<value>` argument.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.args
            .iter()
            .filter_map(move |a| a.strip_prefix(prefix))
            .filter_map(|rest| rest.split_once('='))
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_u64(value: &str) -> Option<u64> {
    let value = value.trim();
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .map_or_else(|| value.parse().ok(), |hex| u64::from_str_radix(hex, 16).ok())
}

/// Platform description: which component slots are present and how they are laid out.
///
/// # Examples
///
/// ```
/// use fasedsim_driver::config::PlatformConfig;
///
/// let json = r#"{ "widgets": [ { "kind": "print" } ], "output_dir": "out" }"#;
/// let platform = PlatformConfig::from_json(json).unwrap();
/// assert!(platform.assertion().is_none());
/// assert!(platform.print().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Memory models, in window-allocation order.
    #[serde(default = "PlatformConfig::default_memory_models")]
    pub memory_models: Vec<MemoryModelConfig>,
    /// Assertion and print widgets (at most one of each).
    #[serde(default = "PlatformConfig::default_widgets")]
    pub widgets: Vec<WidgetConfig>,
    /// Test-harness endpoint (always present).
    #[serde(default)]
    pub test_harness: TestHarnessConfig,
    /// Directory receiving `memory_stats<N>.csv` files.
    #[serde(default = "PlatformConfig::default_output_dir")]
    pub output_dir: PathBuf,
    /// Software substrate settings.
    #[serde(default)]
    pub host: HostConfig,
    /// Demo target design settings.
    #[serde(default)]
    pub traffic: TrafficConfig,
}

impl PlatformConfig {
    fn default_memory_models() -> Vec<MemoryModelConfig> {
        vec![MemoryModelConfig::default()]
    }

    fn default_widgets() -> Vec<WidgetConfig> {
        vec![
            WidgetConfig::Assertion(AssertionConfig::default()),
            WidgetConfig::Print(PrintConfig::default()),
        ]
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from(".")
    }

    /// Parses a platform from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Config`] on malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a platform file.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::File`] if the file cannot be read and
    /// [`DriverError::Config`] if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| DriverError::file(path, e))?;
        Self::from_json(&text)
    }

    /// Checks the single-instance rule for widgets.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::DuplicateWidget`] if more than one assertion or more than
    /// one print widget is configured.
    pub fn validate(&self) -> Result<()> {
        let count = |kind: &str| self.widgets.iter().filter(|w| w.kind() == kind).count();
        for kind in [WidgetConfig::ASSERTION, WidgetConfig::PRINT] {
            if count(kind) > 1 {
                return Err(DriverError::DuplicateWidget(kind));
            }
        }
        Ok(())
    }

    /// The assertion widget, if configured.
    pub fn assertion(&self) -> Option<&AssertionConfig> {
        self.widgets.iter().find_map(|w| match w {
            WidgetConfig::Assertion(a) => Some(a),
            WidgetConfig::Print(_) => None,
        })
    }

    /// The print widget, if configured.
    pub fn print(&self) -> Option<&PrintConfig> {
        self.widgets.iter().find_map(|w| match w {
            WidgetConfig::Print(p) => Some(p),
            WidgetConfig::Assertion(_) => None,
        })
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            memory_models: Self::default_memory_models(),
            widgets: Self::default_widgets(),
            test_harness: TestHarnessConfig::default(),
            output_dir: Self::default_output_dir(),
            host: HostConfig::default(),
            traffic: TrafficConfig::default(),
        }
    }
}

/// One named register of a memory model, at an offset inside the model's window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterConfig {
    /// Register name (used for plusargs and CSV headers).
    pub name: String,
    /// Byte offset from the window base.
    pub offset: u64,
    /// Value written at init when no `+mm_<name>=` plusarg is given (write registers only).
    #[serde(default)]
    pub default: Option<u32>,
}

impl RegisterConfig {
    fn new(name: &str, offset: u64, default: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            offset,
            default,
        }
    }
}

/// A memory-model slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryModelConfig {
    /// Model name used in logs and errors.
    #[serde(default = "MemoryModelConfig::default_name")]
    pub name: String,
    /// Width of the model's host window; the window spans `1 << target_addr_bits` bytes.
    #[serde(default = "MemoryModelConfig::default_target_addr_bits")]
    pub target_addr_bits: u32,
    /// Statistics registers, read back on every profile.
    #[serde(default = "MemoryModelConfig::default_read_registers")]
    pub read_registers: Vec<RegisterConfig>,
    /// Configuration registers, written once at init.
    #[serde(default = "MemoryModelConfig::default_write_registers")]
    pub write_registers: Vec<RegisterConfig>,
}

impl MemoryModelConfig {
    fn default_name() -> String {
        "fased".to_string()
    }

    const fn default_target_addr_bits() -> u32 {
        defaults::TARGET_ADDR_BITS
    }

    fn default_read_registers() -> Vec<RegisterConfig> {
        vec![
            RegisterConfig::new("totalReads", 0x00, None),
            RegisterConfig::new("totalWrites", 0x04, None),
            RegisterConfig::new("totalReadBeats", 0x08, None),
            RegisterConfig::new("totalWriteBeats", 0x0C, None),
        ]
    }

    fn default_write_registers() -> Vec<RegisterConfig> {
        vec![
            RegisterConfig::new("relaxFunctionalModel", 0x40, Some(0)),
            RegisterConfig::new("readMaxReqs", 0x44, Some(8)),
            RegisterConfig::new("writeMaxReqs", 0x48, Some(8)),
        ]
    }
}

impl Default for MemoryModelConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            target_addr_bits: Self::default_target_addr_bits(),
            read_registers: Self::default_read_registers(),
            write_registers: Self::default_write_registers(),
        }
    }
}

/// A single-instance widget slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetConfig {
    /// Assertion checker.
    Assertion(AssertionConfig),
    /// Print capture.
    Print(PrintConfig),
}

impl WidgetConfig {
    /// Kind name of assertion widgets.
    pub const ASSERTION: &'static str = "assertion";
    /// Kind name of print widgets.
    pub const PRINT: &'static str = "print";

    /// Kind name of this widget.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Assertion(_) => Self::ASSERTION,
            Self::Print(_) => Self::PRINT,
        }
    }
}

/// Assertion widget layout and messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssertionConfig {
    /// Base of the register block.
    #[serde(default = "AssertionConfig::default_base")]
    pub base: u64,
    /// Message printed for each assertion id.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl AssertionConfig {
    const fn default_base() -> u64 {
        defaults::ASSERTION_BASE
    }
}

impl Default for AssertionConfig {
    fn default() -> Self {
        Self {
            base: Self::default_base(),
            messages: Vec::new(),
        }
    }
}

/// Print widget layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrintConfig {
    /// Base of the register block.
    #[serde(default = "PrintConfig::default_base")]
    pub base: u64,
}

impl PrintConfig {
    const fn default_base() -> u64 {
        defaults::PRINT_BASE
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            base: Self::default_base(),
        }
    }
}

/// Test-harness layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestHarnessConfig {
    /// Base of the register block.
    #[serde(default = "TestHarnessConfig::default_base")]
    pub base: u64,
}

impl TestHarnessConfig {
    const fn default_base() -> u64 {
        defaults::HARNESS_BASE
    }
}

impl Default for TestHarnessConfig {
    fn default() -> Self {
        Self {
            base: Self::default_base(),
        }
    }
}

/// Software substrate settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Largest number of target cycles one `step` may advance.
    #[serde(default = "HostConfig::default_step_size")]
    pub step_size: u64,
    /// Host cycles consumed per target cycle.
    #[serde(default = "HostConfig::default_host_cycles_per_target")]
    pub host_cycles_per_target: u64,
    /// Target DRAM size in bytes.
    #[serde(default = "HostConfig::default_dram_bytes")]
    pub dram_bytes: usize,
}

impl HostConfig {
    const fn default_step_size() -> u64 {
        defaults::STEP_SIZE
    }

    const fn default_host_cycles_per_target() -> u64 {
        defaults::HOST_CYCLES_PER_TARGET
    }

    const fn default_dram_bytes() -> usize {
        defaults::DRAM_BYTES
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            step_size: Self::default_step_size(),
            host_cycles_per_target: Self::default_host_cycles_per_target(),
            dram_bytes: Self::default_dram_bytes(),
        }
    }
}

/// Traffic generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficConfig {
    /// Memory transactions to issue before signalling done.
    #[serde(default = "TrafficConfig::default_transactions")]
    pub transactions: u64,
    /// Target cycles between two transactions (0 is treated as 1).
    #[serde(default = "TrafficConfig::default_interval")]
    pub interval: u64,
    /// Text streamed through the print widget.
    #[serde(default = "TrafficConfig::default_message")]
    pub message: String,
    /// Cycle at which an assertion fires, if any.
    #[serde(default)]
    pub fail_at: Option<u64>,
    /// Id of the assertion fired at `fail_at`.
    #[serde(default)]
    pub fail_id: u32,
}

impl TrafficConfig {
    const fn default_transactions() -> u64 {
        defaults::TRANSACTIONS
    }

    const fn default_interval() -> u64 {
        defaults::TRANSACTION_INTERVAL
    }

    fn default_message() -> String {
        defaults::MESSAGE.to_string()
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            transactions: Self::default_transactions(),
            interval: Self::default_interval(),
            message: Self::default_message(),
            fail_at: None,
            fail_id: 0,
        }
    }
}
