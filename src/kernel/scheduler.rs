// Cooperative periodic task scheduler
// NOTE: single context only. tick() runs every due handler to
// completion on the caller's stack; a slow handler delays the rest.
//
// One fire per task per tick at most. An overdue task fires once and
// its phase restarts at the tick's timestamp; missed periods are not
// caught up.

use core::fmt;

use super::clock::Clock;
use super::config::Config;
use super::control::{Context, TaskControl, sealed};
use super::registry::TaskTable;
use super::task::{TaskId, TaskRecord};

/// What one `tick()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Clock sample every decision in this tick was made against
    pub now: u32,
    /// Handlers invoked
    pub fired: usize,
    /// Dead records swept at the end of the tick
    pub removed: usize,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick@{}ms fired={} removed={}",
            self.now, self.fired, self.removed
        )
    }
}

/// Owns the task table and the clock. `A` is the per-task payload
/// handed back by [`TaskControl::task_args`]; the scheduler never looks
/// inside it.
///
/// ```
/// use task_jockey::{ManualClock, Scheduler, TaskControl, TaskSpec};
///
/// let clock = ManualClock::new();
/// let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
/// let id = jockey
///     .add_task(|_, _| {}, (), TaskSpec::every(100).times(2))
///     .unwrap();
///
/// clock.set(100);
/// assert_eq!(jockey.tick().fired, 1);
/// clock.set(200);
/// assert_eq!(jockey.tick().removed, 1);
/// assert!(!jockey.contains_task(id));
/// ```
pub struct Scheduler<C, A = ()> {
    clock: C,
    tasks: TaskTable<A>,
    last_tick: Option<u32>,
}

impl<C: Clock, A> Scheduler<C, A> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, Config::default())
    }

    pub fn with_config(clock: C, config: Config) -> Self {
        Self {
            clock,
            tasks: TaskTable::new(config),
            last_tick: None,
        }
    }

    /// Run one dispatch pass.
    ///
    /// Samples the clock once, walks the tasks that existed on entry in
    /// insertion order, fires each one that is due, then sweeps every
    /// Dead record. Tasks added by handlers during the pass are first
    /// considered on the next tick.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let walk_len = self.tasks.len();
        let mut fired = 0;

        for index in 0..walk_len {
            let rec = self.tasks.at_mut(index);

            if rec.is_due(now) {
                let id = rec.id;
                if let Some(mut handler) = rec.handler.take() {
                    log::trace!("jockey: fire {} at {} ms", id, now);
                    let mut ctx = Context {
                        tasks: &mut self.tasks,
                        clock: &self.clock,
                    };
                    handler(&mut ctx, id);

                    // handlers only append or mark, so index still points here
                    let rec = self.tasks.at_mut(index);
                    rec.handler = Some(handler);
                    rec.mark_fired(now);
                    rec.consume_iteration();
                    fired += 1;
                }
            }

            self.tasks.at_mut(index).reap_if_spent();
        }

        let removed = self.tasks.sweep_dead();
        self.last_tick = Some(now);

        TickReport {
            now,
            fired,
            removed,
        }
    }

    /// Clock sample of the most recent tick, `None` before the first.
    pub fn last_tick_ms(&self) -> Option<u32> {
        self.last_tick
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskRecord<A>> {
        self.tasks.iter()
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskRecord<A>> {
        self.tasks.get(id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C: Clock, A> sealed::Access<A> for Scheduler<C, A> {
    #[inline]
    fn table(&self) -> &TaskTable<A> {
        &self.tasks
    }

    #[inline]
    fn table_mut(&mut self) -> &mut TaskTable<A> {
        &mut self.tasks
    }

    #[inline]
    fn now(&self) -> u32 {
        self.clock.now_ms()
    }
}

impl<C: Clock, A> TaskControl<A> for Scheduler<C, A> {}

impl<C: Clock + Default, A> Default for Scheduler<C, A> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: fmt::Debug, A> fmt::Debug for Scheduler<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("tasks", &self.tasks.len())
            .field("last_tick", &self.last_tick)
            .finish()
    }
}
