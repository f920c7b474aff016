//! Host address windows.
//!
//! Every memory model owns a slice of a single flat 64-bit host address space. This module
//! provides the following:
//! 1. **Windows:** The `AddressWindow` (base, size) pair and containment/overlap checks.
//! 2. **Allocation:** A `WindowAllocator` that hands out windows back to back in
//!    registration order, starting at `HOST_MEM_BASE`.
//!
//! All arithmetic is modulo 2^64: the first window starts at `-2^31` and the next ones wrap
//! around through zero. The allocator refuses any request that would make the total
//! allocated size exceed the address space, which is the only way two windows could overlap.

use crate::common::error::{DriverError, Result};

/// Base of the first window: `-2^31` reinterpreted as an unsigned 64-bit address.
pub const HOST_MEM_BASE: u64 = (-0x8000_0000_i64) as u64;

/// Total size of the host address space (2^64 bytes).
const ADDRESS_SPACE: u128 = 1 << 64;

/// A disjoint slice of the flat host address space owned by one memory model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AddressWindow {
    /// First address of the window.
    pub base: u64,
    /// Window size in bytes (`1 << target_addr_bits`).
    pub size: u64,
}

impl AddressWindow {
    /// Creates a window from a base address and a size in bytes.
    pub const fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }

    /// Returns the host address of `offset` within this window (wrapping at 2^64).
    #[inline]
    pub const fn at(&self, offset: u64) -> u64 {
        self.base.wrapping_add(offset)
    }

    /// Returns the base of the window that immediately follows this one.
    #[inline]
    pub const fn end(&self) -> u64 {
        self.base.wrapping_add(self.size)
    }

    /// Returns `true` if `addr` falls inside this window.
    pub const fn contains(&self, addr: u64) -> bool {
        addr.wrapping_sub(self.base) < self.size
    }

    /// Returns `true` if the two windows share at least one address.
    pub const fn overlaps(&self, other: &Self) -> bool {
        if self.size == 0 || other.size == 0 {
            return false;
        }
        self.contains(other.base) || other.contains(self.base)
    }
}

/// Hands out back-to-back address windows in registration order.
#[derive(Clone, Debug)]
pub struct WindowAllocator {
    next_base: u64,
    allocated: u128,
}

impl Default for WindowAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowAllocator {
    /// Creates an allocator whose first window starts at [`HOST_MEM_BASE`].
    pub const fn new() -> Self {
        Self {
            next_base: HOST_MEM_BASE,
            allocated: 0,
        }
    }

    /// Base address the next window will receive.
    pub const fn next_base(&self) -> u64 {
        self.next_base
    }

    /// Allocates a window of `1 << target_addr_bits` bytes.
    ///
    /// # Errors
    ///
    /// * [`DriverError::InvalidWindowWidth`] if `target_addr_bits` is 64 or more.
    /// * [`DriverError::AddressSpaceExhausted`] if the window does not fit in what is left
    ///   of the host address space.
    pub fn allocate(&mut self, target_addr_bits: u32) -> Result<AddressWindow> {
        if target_addr_bits >= u64::BITS {
            return Err(DriverError::InvalidWindowWidth(target_addr_bits));
        }
        let size = 1_u64 << target_addr_bits;
        if self.allocated + u128::from(size) > ADDRESS_SPACE {
            return Err(DriverError::AddressSpaceExhausted {
                requested: size,
                remaining: (ADDRESS_SPACE - self.allocated) as u64,
            });
        }
        let window = AddressWindow::new(self.next_base, size);
        self.allocated += u128::from(size);
        self.next_base = window.end();
        Ok(window)
    }
}
