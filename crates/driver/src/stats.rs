//! End-of-run verdict and performance report.
//!
//! This module turns the raw counters captured when the polling loop exits into the
//! outcome of a run. It provides:
//! 1. **Verdict:** Passed, failed with an endpoint exit code, or timed out.
//! 2. **Speed:** Target cycles per wall-clock millisecond, shown in KHz or MHz.
//! 3. **FMR:** Host cycles consumed per target cycle, the substrate's efficiency.

use std::fmt;
use std::io::{self, Write};

/// Outcome of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// An endpoint ended the run and every exit code was zero.
    Passed,
    /// An endpoint reported a nonzero exit code.
    Failed {
        /// First nonzero exit code in endpoint registration order.
        code: i32,
    },
    /// The cycle budget ran out before any endpoint ended the run.
    TimedOut,
}

impl Verdict {
    /// Classifies a finished run.
    ///
    /// A nonzero exit code always wins; a timeout only counts when no endpoint asked to
    /// terminate.
    pub const fn determine(exit_code: i32, complete: bool, timed_out: bool) -> Self {
        if exit_code != 0 {
            Self::Failed { code: exit_code }
        } else if !complete && timed_out {
            Self::TimedOut
        } else {
            Self::Passed
        }
    }

    /// Returns `true` for a passing run.
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns `true` if the verdict must abort the process (endpoint failure only).
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Simulation speed, scaled for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimSpeed {
    /// Thousands of target cycles per second.
    KHz(f64),
    /// Millions of target cycles per second.
    MHz(f64),
}

impl SimSpeed {
    /// Scales a speed given in KHz; anything above 1000 KHz is shown in MHz.
    pub fn from_khz(khz: f64) -> Self {
        if khz > 1000.0 {
            Self::MHz(khz / 1000.0)
        } else {
            Self::KHz(khz)
        }
    }
}

impl fmt::Display for SimSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KHz(v) => write!(f, "{v:.2} KHz"),
            Self::MHz(v) => write!(f, "{v:.2} MHz"),
        }
    }
}

/// Result of a completed run, computed once when the polling loop exits.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Pass/fail/timeout classification.
    pub verdict: Verdict,
    /// Aggregated endpoint exit code (0 unless failed).
    pub exit_code: i32,
    /// Target cycle at which the loop exited.
    pub end_cycle: u64,
    /// Host cycles elapsed between the start of the run and loop exit.
    pub host_cycles: u64,
    /// Wall-clock seconds elapsed.
    pub sim_time: f64,
    /// Target cycles per millisecond (KHz).
    pub sim_speed: f64,
    /// Host cycles per target cycle.
    pub fmr: f64,
}

impl RunReport {
    /// Derives speed and FMR from the raw counters.
    ///
    /// With `end_cycle == 0` or `sim_time == 0` the ratios follow IEEE float semantics
    /// (infinite or NaN) rather than failing.
    pub fn new(
        verdict: Verdict,
        exit_code: i32,
        end_cycle: u64,
        host_cycles: u64,
        sim_time: f64,
    ) -> Self {
        Self {
            verdict,
            exit_code,
            end_cycle,
            host_cycles,
            sim_time,
            sim_speed: end_cycle as f64 / (sim_time * 1000.0),
            fmr: host_cycles as f64 / end_cycle as f64,
        }
    }

    /// Speed scaled for display.
    pub fn speed(&self) -> SimSpeed {
        SimSpeed::from_khz(self.sim_speed)
    }

    /// The one-line pass/fail banner.
    pub fn banner(&self) -> String {
        match self.verdict {
            Verdict::Failed { code } => {
                format!("*** FAILED *** (code = {code}) after {} cycles", self.end_cycle)
            }
            Verdict::TimedOut => format!("*** FAILED *** (timeout) after {} cycles", self.end_cycle),
            Verdict::Passed => format!("*** PASSED *** after {} cycles", self.end_cycle),
        }
    }

    /// Writes the banner, the elapsed-time/speed line, and the FMR line.
    ///
    /// # Errors
    ///
    /// Propagates any write error from `out`.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.banner())?;
        writeln!(
            out,
            "time elapsed: {:.1} s, simulation speed = {}",
            self.sim_time,
            self.speed()
        )?;
        writeln!(out, "FPGA-Cycles-to-Model-Cycles Ratio (FMR): {:.2}", self.fmr)
    }
}
