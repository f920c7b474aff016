//! The driver: owns every component and runs the polling loop.
//!
//! A run goes through these phases:
//! 1. **Init:** Memory models first, then endpoints, in registration order.
//! 2. **Reset:** Optional DRAM clear, then reset held for `RESET_CYCLES` from cycle 0.
//! 3. **Loop:** Run due tasks, step by the largest safe amount, and tick every endpoint
//!    once per polled cycle until an endpoint terminates or the budget runs out.
//! 4. **Report:** Verdict, speed, and FMR on the diagnostic stream.
//! 5. **Finalize:** Memory models and the print endpoint are finished, unless an
//!    endpoint failed, which is fatal.

use std::fmt;
use std::io::{self, Write};

use tracing::{debug, error, info};

use crate::common::constants::{RESET_CYCLES, RESET_START_CYCLE};
use crate::common::{AddressWindow, DriverError, Result, WindowAllocator};
use crate::config::{RunConfig, WidgetConfig};
use crate::endpoints::Endpoint;
use crate::models::MemoryModel;
use crate::sim::scheduler::TaskRegistry;
use crate::simif::Simif;
use crate::stats::{RunReport, Verdict};

/// The substrate together with the memory models; this is what scheduled tasks operate on.
pub struct Host<S> {
    /// Simulation substrate.
    pub simif: S,
    /// Memory models in registration order.
    pub models: Vec<Box<dyn MemoryModel>>,
}

impl<S: Simif> Host<S> {
    /// Profiles every memory model in registration order.
    ///
    /// # Errors
    ///
    /// Stops at the first model whose profile fails.
    pub fn profile_models(&mut self) -> Result<()> {
        for model in &mut self.models {
            model.profile(&mut self.simif)?;
        }
        Ok(())
    }
}

impl<S: fmt::Debug> fmt::Debug for Host<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("simif", &self.simif)
            .field(
                "models",
                &self.models.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Host-side driver.
pub struct Driver<S> {
    config: RunConfig,
    host: Host<S>,
    endpoints: Vec<Box<dyn Endpoint>>,
    print_endpoint: Option<usize>,
    tasks: TaskRegistry<Host<S>>,
    windows: WindowAllocator,
    diag: Box<dyn Write>,
}

impl<S: fmt::Debug> fmt::Debug for Driver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .field("host", &self.host)
            .field(
                "endpoints",
                &self.endpoints.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("print_endpoint", &self.print_endpoint)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl<S: Simif + 'static> Driver<S> {
    /// Creates a driver with no models or endpoints.
    ///
    /// Hands `config.max_cycles` to the substrate as its cycle budget and, unless profiling
    /// is disabled, registers the model-profiling task due at cycle 0. Diagnostics go to
    /// stderr until replaced with [`with_diagnostics`](Self::with_diagnostics).
    pub fn new(config: RunConfig, mut simif: S) -> Self {
        simif.set_cycle_budget(config.max_cycles);
        let mut tasks = TaskRegistry::new();
        if let Some(interval) = config.profile_interval {
            debug!(interval, "registering memory-model profiling task");
            tasks.register(
                move |host: &mut Host<S>| {
                    host.profile_models()?;
                    Ok(interval)
                },
                0,
            );
        }
        Self {
            config,
            host: Host {
                simif,
                models: Vec::new(),
            },
            endpoints: Vec::new(),
            print_endpoint: None,
            tasks,
            windows: WindowAllocator::new(),
            diag: Box::new(io::stderr()),
        }
    }

    /// Redirects the verdict and progress lines to `diag`.
    #[must_use]
    pub fn with_diagnostics(mut self, diag: Box<dyn Write>) -> Self {
        self.diag = diag;
        self
    }

    /// Run flags this driver was built with.
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The simulation substrate.
    pub const fn simif(&self) -> &S {
        &self.host.simif
    }

    /// Mutable access to the simulation substrate.
    pub const fn simif_mut(&mut self) -> &mut S {
        &mut self.host.simif
    }

    /// Memory models in registration order.
    pub fn models(&self) -> &[Box<dyn MemoryModel>] {
        &self.host.models
    }

    /// Endpoints in registration order.
    pub fn endpoints(&self) -> &[Box<dyn Endpoint>] {
        &self.endpoints
    }

    /// The print endpoint, if one was added.
    pub fn print_endpoint(&self) -> Option<&dyn Endpoint> {
        self.print_endpoint
            .and_then(|idx| self.endpoints.get(idx))
            .map(|e| &**e)
    }

    /// Scheduled tasks.
    pub const fn tasks(&self) -> &TaskRegistry<Host<S>> {
        &self.tasks
    }

    /// Assigns the next memory-model window (`1 << target_addr_bits` bytes).
    ///
    /// # Errors
    ///
    /// See [`WindowAllocator::allocate`].
    pub fn allocate_window(&mut self, target_addr_bits: u32) -> Result<AddressWindow> {
        self.windows.allocate(target_addr_bits)
    }

    /// Appends a memory model.
    pub fn add_memory_model(&mut self, model: Box<dyn MemoryModel>) {
        self.host.models.push(model);
    }

    /// Appends an endpoint; it is ticked after every endpoint added before it.
    pub fn add_endpoint(&mut self, endpoint: Box<dyn Endpoint>) {
        self.endpoints.push(endpoint);
    }

    /// Appends the print endpoint and keeps a handle to it for the final flush.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::DuplicateWidget`] if a print endpoint was already added.
    pub fn add_print_endpoint(&mut self, endpoint: Box<dyn Endpoint>) -> Result<()> {
        if self.print_endpoint.is_some() {
            return Err(DriverError::DuplicateWidget(WidgetConfig::PRINT));
        }
        self.print_endpoint = Some(self.endpoints.len());
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Registers a periodic task first due at `initial_due`.
    pub fn register_task<F>(&mut self, task: F, initial_due: u64)
    where
        F: FnMut(&mut Host<S>) -> Result<u64> + 'static,
    {
        self.tasks.register(task, initial_due);
    }

    /// Returns `true` if any endpoint asks to terminate. Every endpoint is queried.
    pub fn simulation_complete(&self) -> bool {
        self.endpoints
            .iter()
            .fold(false, |complete, e| complete | e.terminate())
    }

    /// First nonzero endpoint exit code in registration order, or 0.
    pub fn exit_code(&self) -> i32 {
        self.endpoints
            .iter()
            .map(|e| e.exit_code())
            .find(|&code| code != 0)
            .unwrap_or(0)
    }

    /// Profiles every memory model and returns the configured profiling interval.
    ///
    /// # Errors
    ///
    /// Propagates the first model profiling failure.
    pub fn profile_models(&mut self) -> Result<Option<u64>> {
        self.host.profile_models()?;
        Ok(self.config.profile_interval)
    }

    /// Cycles to advance from `now`: the substrate's largest step, cut short at the next
    /// due task. Never less than one.
    pub fn step_size(&self, now: u64) -> u64 {
        let largest = self.host.simif.largest_step_size();
        self.tasks
            .next_due()
            .map_or(largest, |due| largest.min(due.saturating_sub(now)))
            .max(1)
    }

    /// Runs the simulation to completion and reports the outcome.
    ///
    /// A timeout is a failed verdict but not an error.
    ///
    /// # Errors
    ///
    /// * [`DriverError::AssertionFailed`] if an endpoint reports a nonzero exit code. The
    ///   report has already been printed and components are not finalized.
    /// * Any error raised by component init, scheduled tasks, finalization, or the
    ///   diagnostic stream.
    pub fn run(&mut self) -> Result<RunReport> {
        for model in &mut self.host.models {
            model.init(&mut self.host.simif)?;
        }
        for endpoint in &mut self.endpoints {
            endpoint.init(&mut self.host.simif)?;
        }

        if self.config.zero_out_dram {
            writeln!(
                self.diag,
                "Zeroing out FPGA DRAM. This will take a few seconds..."
            )?;
            self.host.simif.zero_out_dram();
        }
        writeln!(self.diag, "Commencing simulation.")?;
        info!(
            models = self.host.models.len(),
            endpoints = self.endpoints.len(),
            max_cycles = ?self.config.max_cycles,
            "commencing simulation"
        );

        let start_hcycle = self.host.simif.hcycle();
        let start_time = self.host.simif.timestamp();

        self.host
            .simif
            .target_reset(RESET_START_CYCLE, RESET_CYCLES);

        while !self.simulation_complete() && !self.host.simif.has_timed_out() {
            let now = self.host.simif.actual_tcycle();
            let ran = self.tasks.run_due(now, &mut self.host)?;
            if ran > 0 {
                debug!(now, ran, "ran scheduled tasks");
            }

            let step = self.step_size(now);
            self.host.simif.step(step, false);
            while !self.simulation_complete() && !self.host.simif.done() {
                for endpoint in &mut self.endpoints {
                    endpoint.tick(&mut self.host.simif);
                }
            }
        }

        let end_time = self.host.simif.timestamp();
        let end_cycle = self.host.simif.actual_tcycle();
        let host_cycles = self.host.simif.hcycle().saturating_sub(start_hcycle);
        let sim_time = self.host.simif.diff_secs(end_time, start_time);

        // Target output may not end with a newline.
        writeln!(self.diag)?;

        let exit_code = self.exit_code();
        let verdict = Verdict::determine(
            exit_code,
            self.simulation_complete(),
            self.host.simif.has_timed_out(),
        );
        let report = RunReport::new(verdict, exit_code, end_cycle, host_cycles, sim_time);
        report.write_to(&mut *self.diag)?;
        self.diag.flush()?;
        info!(
            ?verdict,
            end_cycle,
            host_cycles,
            fmr = report.fmr,
            "simulation finished"
        );

        if verdict.is_fatal() {
            error!(code = exit_code, cycle = end_cycle, "endpoint failure");
            return Err(DriverError::AssertionFailed {
                code: exit_code,
                cycle: end_cycle,
            });
        }

        for model in &mut self.host.models {
            model.finish(&mut self.host.simif)?;
        }
        if let Some(print) = self
            .print_endpoint
            .and_then(|idx| self.endpoints.get_mut(idx))
        {
            print.finish(&mut self.host.simif)?;
        }
        Ok(report)
    }
}
