// Scheduler tunables
//
// Everything else (tick rate, clock source) belongs to the host loop.

/// Hard ceiling imposed by the 8-bit id space (0 is reserved).
pub const MAX_TASKS: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Live records allowed at once, Dead-but-unswept ones included.
    /// Registration past this fails like id exhaustion.
    pub max_tasks: u8,
    /// Reserve room for `max_tasks` records up front so registration
    /// never reallocates after boot.
    pub preallocate: bool,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            max_tasks: MAX_TASKS,
            preallocate: false,
        }
    }

    pub const fn with_max_tasks(mut self, max_tasks: u8) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    pub const fn preallocated(mut self) -> Self {
        self.preallocate = true;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
