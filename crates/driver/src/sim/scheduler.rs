//! Scheduled-task registry.
//!
//! Tasks are callbacks invoked on a paused simulator, keyed by the target cycle at which
//! they are next due. The driver calls [`TaskRegistry::run_due`] once per loop iteration,
//! before advancing the clock. A task that runs returns the offset, from the current cycle,
//! at which it wants to run again; rescheduling is unconditional, so every task is periodic.

use std::fmt;

use crate::common::Result;

/// Callback type: receives the driver context and returns the next offset in cycles.
pub type TaskFn<C> = Box<dyn FnMut(&mut C) -> Result<u64>>;

struct ScheduledTask<C> {
    callback: TaskFn<C>,
    due: u64,
}

/// Periodic callbacks keyed by due cycle.
pub struct TaskRegistry<C> {
    tasks: Vec<ScheduledTask<C>>,
}

impl<C> fmt::Debug for TaskRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("due", &self.tasks.iter().map(|t| t.due).collect::<Vec<_>>())
            .finish()
    }
}

impl<C> Default for TaskRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TaskRegistry<C> {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Adds a task first due at target cycle `initial_due`.
    pub fn register<F>(&mut self, callback: F, initial_due: u64)
    where
        F: FnMut(&mut C) -> Result<u64> + 'static,
    {
        self.tasks.push(ScheduledTask {
            callback: Box::new(callback),
            due: initial_due,
        });
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest due cycle over all tasks.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.iter().map(|t| t.due).min()
    }

    /// Runs every task due at or before `now`, in registration order.
    ///
    /// Each task that runs is rescheduled to `now + returned_offset`. Returns how many
    /// tasks ran.
    ///
    /// # Errors
    ///
    /// Stops at the first failing task and returns its error; that task keeps its old due
    /// cycle.
    pub fn run_due(&mut self, now: u64, ctx: &mut C) -> Result<usize> {
        let mut ran = 0;
        for task in self.tasks.iter_mut().filter(|t| t.due <= now) {
            let offset = (task.callback)(ctx)?;
            task.due = now.saturating_add(offset);
            ran += 1;
        }
        Ok(ran)
    }
}
