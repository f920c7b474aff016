//! Register-mapped timing model.
//!
//! `TimingModel` is the host half of a memory timing model living in the target. It performs:
//! 1. **Configuration:** Resolves every write register from `+mm_<name>=<value>` plusargs or
//!    the platform default, and programs them at init.
//! 2. **Statistics:** Reads every read register on each profile and appends one CSV row
//!    (`cycle,<reg>,...`) to its statistics file.
//! 3. **Finish:** Takes a last sample and flushes the file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::common::constants::PLUSARG_MEMORY_MODEL_PREFIX;
use crate::common::{AddressWindow, DriverError, Result};
use crate::config::{MemoryModelConfig, PlusArgs, parse_u64};
use crate::models::{AddressMap, MemoryModel};
use crate::simif::Simif;

/// Register-mapped memory timing model.
#[derive(Debug)]
pub struct TimingModel {
    name: String,
    window: AddressWindow,
    addr_map: AddressMap,
    settings: Vec<(u64, u32)>,
    stats_path: PathBuf,
    stats: Option<BufWriter<File>>,
    samples: u64,
}

impl TimingModel {
    /// Creates a model bound to `window`, writing statistics to `stats_path`.
    ///
    /// # Errors
    ///
    /// `+mm_` plusargs naming registers this model does not have are skipped; they may
    /// belong to another model.
    ///
    /// * [`DriverError::InvalidPlusArg`] if a `+mm_` value is not a 32-bit number.
    /// * [`DriverError::MissingRegisterValue`] if a write register has neither a plusarg nor
    ///   a default.
    pub fn new(
        config: &MemoryModelConfig,
        window: AddressWindow,
        args: &PlusArgs,
        stats_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let addr_map = AddressMap::from_config(config);

        let mut overrides = Vec::new();
        for (name, value) in args.with_prefix(PLUSARG_MEMORY_MODEL_PREFIX) {
            if !addr_map.w_reg_exists(name) {
                trace!(model = %config.name, register = name, "plusarg for another model");
                continue;
            }
            let value = parse_u64(value)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| DriverError::InvalidPlusArg {
                    flag: PLUSARG_MEMORY_MODEL_PREFIX,
                    value: format!("{name}={value}"),
                })?;
            overrides.push((name, value));
        }

        let settings = config
            .write_registers
            .iter()
            .map(|reg| {
                overrides
                    .iter()
                    .rev()
                    .find(|(name, _)| *name == reg.name)
                    .map(|&(_, v)| v)
                    .or(reg.default)
                    .map(|v| (reg.offset, v))
                    .ok_or_else(|| DriverError::MissingRegisterValue {
                        model: config.name.clone(),
                        register: reg.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: config.name.clone(),
            window,
            addr_map,
            settings,
            stats_path: stats_path.into(),
            stats: None,
            samples: 0,
        })
    }

    /// The model's register address map.
    pub const fn address_map(&self) -> &AddressMap {
        &self.addr_map
    }

    /// Path of the statistics file.
    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// Rows written to the statistics file so far.
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    fn file_error(&self, e: std::io::Error) -> DriverError {
        DriverError::file(&self.stats_path, e)
    }

    fn open_stats(&mut self) -> Result<()> {
        if let Some(dir) = self.stats_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.file_error(e))?;
        }
        let file = File::create(&self.stats_path).map_err(|e| self.file_error(e))?;
        let mut out = BufWriter::new(file);
        let header = std::iter::once("cycle")
            .chain(self.addr_map.read_registers().iter().map(|r| r.name.as_str()))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{header}").map_err(|e| self.file_error(e))?;
        self.stats = Some(out);
        Ok(())
    }
}

impl MemoryModel for TimingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> AddressWindow {
        self.window
    }

    fn init(&mut self, sim: &mut dyn Simif) -> Result<()> {
        for &(offset, value) in &self.settings {
            sim.write(self.window.at(offset), value);
        }
        self.open_stats()?;
        info!(
            model = %self.name,
            base = self.window.base,
            stats = %self.stats_path.display(),
            "memory model initialized"
        );
        Ok(())
    }

    fn profile(&mut self, sim: &mut dyn Simif) -> Result<()> {
        let mut row = sim.actual_tcycle().to_string();
        for reg in self.addr_map.read_registers() {
            row.push(',');
            row.push_str(&sim.read(self.window.at(reg.offset)).to_string());
        }
        let Some(out) = self.stats.as_mut() else {
            return Ok(());
        };
        if let Err(e) = writeln!(out, "{row}") {
            return Err(DriverError::file(&self.stats_path, e));
        }
        self.samples += 1;
        debug!(model = %self.name, samples = self.samples, "profiled");
        Ok(())
    }

    fn finish(&mut self, sim: &mut dyn Simif) -> Result<()> {
        self.profile(sim)?;
        if let Some(mut out) = self.stats.take() {
            out.flush().map_err(|e| self.file_error(e))?;
        }
        Ok(())
    }
}
