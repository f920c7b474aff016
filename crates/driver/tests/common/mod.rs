//! Shared test infrastructure.

/// Tracing setup, capture buffers, and platform helpers.
pub mod harness;
