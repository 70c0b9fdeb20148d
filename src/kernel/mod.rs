// Cooperative periodic scheduler and its time source
// Single core, no preemption. The host main loop calls tick();
// handlers run to completion on its stack.
//
// clock: ms time sources (ISR-fed uptime, manual for tests)
// task/ident/registry: records, id allocation, ordered table
// control: id-keyed control API shared by Scheduler and Context
// scheduler: the tick() dispatch pass

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod ident;
pub mod registry;
pub mod scheduler;
pub mod task;

pub use clock::{Clock, FnClock, ManualClock, UptimeClock};
pub use config::Config;
pub use control::{Context, TaskControl};
pub use error::AddTaskError;
pub use scheduler::{Scheduler, TickReport};
pub use task::{FOREVER, MAX_INTERVAL_MS, TaskId, TaskRecord, TaskSpec, TaskState};
