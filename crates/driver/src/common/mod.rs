//! Common types used throughout the driver.
//!
//! This module provides the small building blocks shared by every component:
//! 1. **Address Windows:** Disjoint slices of the flat host address space and their allocator.
//! 2. **Constants:** Reset timing, register offsets, and plusarg names.
//! 3. **Error Handling:** The `DriverError` type returned by all fallible operations.

/// Address window types and the window allocator.
pub mod addr;

/// Constants shared across the driver.
pub mod constants;

/// Error type for driver operations.
pub mod error;

pub use addr::{AddressWindow, HOST_MEM_BASE, WindowAllocator};
pub use error::{DriverError, Result};
