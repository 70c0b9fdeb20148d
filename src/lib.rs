// task-jockey: cooperative "run this every N ms" scheduler for
// single-threaded MCU main loops

#![cfg_attr(not(test), no_std)]

pub mod kernel;

pub use kernel::{
    AddTaskError, Clock, Config, Context, FOREVER, FnClock, MAX_INTERVAL_MS, ManualClock,
    Scheduler, TaskControl, TaskId, TaskRecord, TaskSpec, TaskState, TickReport, UptimeClock,
};
