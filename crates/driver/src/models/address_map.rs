//! Register address maps.
//!
//! An `AddressMap` names the registers of one memory model: read registers hold
//! statistics, write registers hold configuration. Offsets are relative to the model's
//! address window; order is preserved so CSV columns follow the platform description.

use crate::config::MemoryModelConfig;

/// One named register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    /// Register name.
    pub name: String,
    /// Byte offset inside the model window.
    pub offset: u64,
}

fn registers<'a>(regs: impl IntoIterator<Item = (&'a str, u64)>) -> Vec<Register> {
    regs.into_iter()
        .map(|(name, offset)| Register {
            name: name.to_string(),
            offset,
        })
        .collect()
}

/// Named read and write registers of a memory model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressMap {
    read: Vec<Register>,
    write: Vec<Register>,
}

impl AddressMap {
    /// Creates a map from `(name, offset)` lists.
    pub fn new<'a>(
        read: impl IntoIterator<Item = (&'a str, u64)>,
        write: impl IntoIterator<Item = (&'a str, u64)>,
    ) -> Self {
        Self {
            read: registers(read),
            write: registers(write),
        }
    }

    /// Builds the map described by a memory-model slot.
    pub fn from_config(config: &MemoryModelConfig) -> Self {
        Self::new(
            config
                .read_registers
                .iter()
                .map(|r| (r.name.as_str(), r.offset)),
            config
                .write_registers
                .iter()
                .map(|r| (r.name.as_str(), r.offset)),
        )
    }

    /// Offset of the read register `name`.
    pub fn r_addr(&self, name: &str) -> Option<u64> {
        self.read.iter().find(|r| r.name == name).map(|r| r.offset)
    }

    /// Offset of the write register `name`.
    pub fn w_addr(&self, name: &str) -> Option<u64> {
        self.write.iter().find(|r| r.name == name).map(|r| r.offset)
    }

    /// Returns `true` if `name` is a write register.
    pub fn w_reg_exists(&self, name: &str) -> bool {
        self.w_addr(name).is_some()
    }

    /// Read registers in declaration order.
    pub fn read_registers(&self) -> &[Register] {
        &self.read
    }

    /// Write registers in declaration order.
    pub fn write_registers(&self) -> &[Register] {
        &self.write
    }
}
