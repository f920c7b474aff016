//! Endpoints.
//!
//! An endpoint bridges host-side control or observation logic and target-visible
//! registers. The driver ticks every endpoint once per polled target cycle and asks each of
//! them, every iteration, whether the run should end and with which exit code.
//!
//! This module contains the [`Endpoint`] trait and its implementations:
//! 1. **Assertions:** Reports synthesized assertion failures and ends the run.
//! 2. **Prints:** Captures bytes printed by the target.
//! 3. **Test harness:** Watches the target's done/error registers.

/// Assertion-checking endpoint.
pub mod assertions;

/// Print-capture endpoint.
pub mod prints;

/// Test-harness endpoint.
pub mod test_harness;

pub use assertions::AssertionEndpoint;
pub use prints::PrintEndpoint;
pub use test_harness::TestHarness;

use crate::common::Result;
use crate::simif::Simif;

/// Capability shared by every endpoint.
///
/// `terminate` and `exit_code` report state captured by earlier `tick` calls; they must not
/// touch the substrate, so the driver can query them at any point of the loop.
pub trait Endpoint {
    /// Short name used in logs (e.g. `"assertions"`).
    fn name(&self) -> &str;

    /// Called once at the start of the run, after every memory model is initialized.
    fn init(&mut self, _sim: &mut dyn Simif) -> Result<()> {
        Ok(())
    }

    /// Advances the endpoint's protocol state by one host poll.
    fn tick(&mut self, sim: &mut dyn Simif);

    /// Returns `true` if this endpoint wants the run to end.
    fn terminate(&self) -> bool;

    /// Returns the endpoint's exit code; nonzero means failure.
    fn exit_code(&self) -> i32;

    /// Final flush after a successful run.
    fn finish(&mut self, _sim: &mut dyn Simif) -> Result<()> {
        Ok(())
    }
}
