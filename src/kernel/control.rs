// Task control API, keyed by id
//
// Shared by the Scheduler (main loop side) and Context (handed to
// handlers during tick). Context exposes everything except tick, so
// a handler cannot re-enter the dispatch loop.
//
// Unknown ids are a silent no-op: mutators return false, getters None.

extern crate alloc;

use alloc::boxed::Box;

use super::clock::Clock;
use super::error::AddTaskError;
use super::registry::TaskTable;
use super::task::{TaskId, TaskSpec, TaskState};

pub(crate) mod sealed {
    use super::TaskTable;

    pub trait Access<A> {
        fn table(&self) -> &TaskTable<A>;
        fn table_mut(&mut self) -> &mut TaskTable<A>;
        fn now(&self) -> u32;
    }
}

pub trait TaskControl<A>: sealed::Access<A> {
    /// Register a periodic task. The handler gets a [`Context`] and its
    /// own id on every fire.
    fn add_task<F>(&mut self, handler: F, args: A, spec: TaskSpec) -> Result<TaskId, AddTaskError>
    where
        F: FnMut(&mut Context<'_, A>, TaskId) + 'static,
        Self: Sized,
    {
        let now = self.now();
        self.table_mut().insert(Box::new(handler), args, spec, now)
    }

    /// Active -> Paused, remembering how far into the period it was.
    fn pause_task(&mut self, id: TaskId) -> bool {
        let now = self.now();
        self.table_mut().get_mut(id).map(|r| r.pause(now)).is_some()
    }

    /// Paused -> Active at the same position within the period.
    fn resume_task(&mut self, id: TaskId) -> bool {
        let now = self.now();
        self.table_mut().get_mut(id).map(|r| r.resume(now)).is_some()
    }

    /// Restart the period from now. A paused task stays paused, and a
    /// later resume starts a full period.
    fn reset_task_timer(&mut self, id: TaskId) -> bool {
        let now = self.now();
        self.table_mut()
            .get_mut(id)
            .map(|r| r.reset_timer(now))
            .is_some()
    }

    fn kill_task(&mut self, id: TaskId) -> bool {
        self.table_mut().get_mut(id).map(|r| r.kill()).is_some()
    }

    fn kill_all_tasks(&mut self) {
        self.table_mut().kill_all();
    }

    fn task_args(&self, id: TaskId) -> Option<&A> {
        self.table().get(id).map(|r| &r.args)
    }

    fn task_args_mut(&mut self, id: TaskId) -> Option<&mut A> {
        self.table_mut().get_mut(id).map(|r| &mut r.args)
    }

    fn task_interval(&self, id: TaskId) -> Option<u32> {
        self.table().get(id).map(|r| r.interval)
    }

    /// 0 is accepted: the task stays registered but never fires again
    /// until given a non-zero interval.
    fn set_task_interval(&mut self, id: TaskId, interval: u32) -> bool {
        if interval == 0 {
            log::debug!("jockey: task {} interval set to 0, effectively paused", id);
        }
        self.table_mut()
            .get_mut(id)
            .map(|r| r.interval = interval)
            .is_some()
    }

    fn task_iterations_remaining(&self, id: TaskId) -> Option<i16> {
        self.table().get(id).map(|r| r.iterations)
    }

    fn task_last_run_time(&self, id: TaskId) -> Option<u32> {
        self.table().get(id).map(|r| r.last_run)
    }

    fn task_state(&self, id: TaskId) -> Option<TaskState> {
        self.table().get(id).map(|r| r.state)
    }

    fn contains_task(&self, id: TaskId) -> bool {
        self.table().contains(id)
    }

    /// Registered records, Dead-but-unswept included.
    fn task_count(&self) -> usize {
        self.table().len()
    }
}

/// Scheduler view handed to a task handler while it runs.
pub struct Context<'a, A> {
    pub(crate) tasks: &'a mut TaskTable<A>,
    pub(crate) clock: &'a dyn Clock,
}

impl<A> Context<'_, A> {
    /// Fresh clock reading, not the tick's sample.
    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}

impl<A> sealed::Access<A> for Context<'_, A> {
    #[inline]
    fn table(&self) -> &TaskTable<A> {
        &*self.tasks
    }

    #[inline]
    fn table_mut(&mut self) -> &mut TaskTable<A> {
        &mut *self.tasks
    }

    #[inline]
    fn now(&self) -> u32 {
        self.clock.now_ms()
    }
}

impl<A> TaskControl<A> for Context<'_, A> {}
