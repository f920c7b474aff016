//! Driver and run orchestration.
//!
//! Provides the driver that owns and sequences every component, the registry of periodic
//! tasks it runs between steps, and the builder that assembles a driver from a platform
//! description.

/// Platform builder.
pub mod builder;
/// Driver and its polling loop.
pub mod driver;
/// Scheduled-task registry.
pub mod scheduler;

pub use builder::build_driver;
pub use driver::{Driver, Host};
pub use scheduler::TaskRegistry;
