//! Synthesized assertion endpoint.
//!
//! Polls the assertion widget's FIRE register. The first assertion to fire is latched:
//! its message is reported, the endpoint asks the run to terminate, and its exit code
//! becomes `id + 1` so that assertion 0 still produces a nonzero code. The report line goes
//! to stderr unless another sink is given.
//!
//! # Registers
//!
//! * `0x00`: FIRE (nonzero while an assertion is firing)
//! * `0x04`: ID (index into the message table)
//! * `0x08` / `0x0C`: CYCLE low / high word

use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::common::constants::{ASSERT_CYCLE_HI, ASSERT_CYCLE_LO, ASSERT_FIRE, ASSERT_ID};
use crate::config::AssertionConfig;
use crate::endpoints::Endpoint;
use crate::simif::Simif;

/// A latched assertion failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiredAssertion {
    /// Assertion index.
    pub id: u32,
    /// Target cycle at which it fired.
    pub cycle: u64,
    /// Message for `id`, or a placeholder when the table has no entry.
    pub message: String,
}

impl fmt::Display for FiredAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[id: {}, cycle: {}] {}", self.id, self.cycle, self.message)
    }
}

/// Assertion-checking endpoint.
pub struct AssertionEndpoint {
    base: u64,
    messages: Vec<String>,
    fired: Option<FiredAssertion>,
    sink: Box<dyn Write>,
}

impl fmt::Debug for AssertionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionEndpoint")
            .field("base", &self.base)
            .field("messages", &self.messages)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl AssertionEndpoint {
    /// Creates the endpoint for the widget described by `config`, reporting to stderr.
    pub fn new(config: &AssertionConfig) -> Self {
        Self::with_sink(config, Box::new(io::stderr()))
    }

    /// Creates the endpoint, writing the fired assertion's report line to `sink`.
    pub fn with_sink(config: &AssertionConfig, sink: Box<dyn Write>) -> Self {
        Self {
            base: config.base,
            messages: config.messages.clone(),
            fired: None,
            sink,
        }
    }

    /// The latched assertion, if one has fired.
    pub const fn fired(&self) -> Option<&FiredAssertion> {
        self.fired.as_ref()
    }

    fn message(&self, id: u32) -> String {
        self.messages
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| format!("assertion {id} fired"))
    }
}

impl Endpoint for AssertionEndpoint {
    fn name(&self) -> &str {
        "assertions"
    }

    fn tick(&mut self, sim: &mut dyn Simif) {
        if self.fired.is_some() || sim.read(self.base + ASSERT_FIRE) == 0 {
            return;
        }
        let id = sim.read(self.base + ASSERT_ID);
        let lo = u64::from(sim.read(self.base + ASSERT_CYCLE_LO));
        let hi = u64::from(sim.read(self.base + ASSERT_CYCLE_HI));
        let fired = FiredAssertion {
            id,
            cycle: (hi << 32) | lo,
            message: self.message(id),
        };
        warn!(id, cycle = fired.cycle, "assertion fired");
        if let Err(e) = writeln!(self.sink, "{fired}").and_then(|()| self.sink.flush()) {
            warn!(error = %e, "assertion report write failed");
        }
        self.fired = Some(fired);
    }

    fn terminate(&self) -> bool {
        self.fired.is_some()
    }

    fn exit_code(&self) -> i32 {
        self.fired
            .as_ref()
            .map_or(0, |f| (f.id as i32).saturating_add(1))
    }
}
