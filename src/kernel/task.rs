// Task identity, schedule and per-task record
//
// One TaskRecord per registered task, owned by the scheduler for the
// task's whole life. Timing fields are wrapping u32 ms; the only
// meaningful operation on them is wrapping_sub.

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;
use core::num::NonZeroU8;

use super::control::Context;

/// Largest interval that still compares correctly across one clock wrap.
pub const MAX_INTERVAL_MS: u32 = i32::MAX as u32;

/// Iteration count meaning "run until killed".
pub const FOREVER: i16 = -1;

/// Handle to a registered task. Never zero; 0 is reserved for "no task"
/// at the FFI/diagnostic level and cannot be constructed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(NonZeroU8);

impl TaskId {
    pub const fn new(raw: u8) -> Option<Self> {
        match NonZeroU8::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    // 255 wraps to 1, skipping the reserved 0
    pub(crate) const fn wrapping_next(self) -> Self {
        match NonZeroU8::new(self.0.get().wrapping_add(1)) {
            Some(id) => Self(id),
            None => Self(NonZeroU8::MIN),
        }
    }

    pub(crate) const FIRST: Self = Self(NonZeroU8::MIN);
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.get())
    }
}

impl From<TaskId> for u8 {
    fn from(id: TaskId) -> u8 {
        id.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Fires when due
    #[default]
    Active,
    /// Registered, holding its position within the period
    Paused,
    /// Removed at the end of the next tick
    Dead,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Active => write!(f, "Active"),
            TaskState::Paused => write!(f, "Paused"),
            TaskState::Dead => write!(f, "Dead"),
        }
    }
}

/// How often and how many times a task should fire.
///
/// ```
/// use task_jockey::TaskSpec;
///
/// // every 250 ms, first fire on the next tick, 10 fires total
/// let spec = TaskSpec::every(250).immediately().times(10);
/// assert_eq!(spec.offset_start, 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub interval: u32,
    /// How much of the first period counts as already elapsed at
    /// registration. 0 fires one full interval later; `interval`
    /// fires on the next tick.
    pub offset_start: u32,
    /// Negative for unbounded; 0 admits the task but kills it on the
    /// first tick.
    pub iterations: i16,
}

impl TaskSpec {
    pub const fn every(interval_ms: u32) -> Self {
        Self {
            interval: interval_ms,
            offset_start: 0,
            iterations: FOREVER,
        }
    }

    pub const fn offset(mut self, ms: u32) -> Self {
        self.offset_start = ms;
        self
    }

    // eligible on the very next tick
    pub const fn immediately(mut self) -> Self {
        self.offset_start = self.interval;
        self
    }

    pub const fn times(mut self, iterations: i16) -> Self {
        self.iterations = iterations;
        self
    }

    pub const fn forever(mut self) -> Self {
        self.iterations = FOREVER;
        self
    }
}

pub(crate) type Handler<A> = Box<dyn FnMut(&mut Context<'_, A>, TaskId)>;

pub struct TaskRecord<A> {
    pub(crate) id: TaskId,
    // None only while the handler is running
    pub(crate) handler: Option<Handler<A>>,
    pub(crate) args: A,
    pub(crate) interval: u32,
    pub(crate) iterations: i16,
    pub(crate) state: TaskState,
    pub(crate) last_run: u32,
    pub(crate) elapsed: u32,
}

impl<A> TaskRecord<A> {
    pub(crate) fn new(id: TaskId, handler: Handler<A>, args: A, spec: &TaskSpec, now: u32) -> Self {
        Self {
            id,
            handler: Some(handler),
            args,
            interval: spec.interval,
            iterations: spec.iterations,
            state: TaskState::Active,
            // the first period starts offset_start ms in the past
            last_run: now.wrapping_sub(spec.offset_start),
            elapsed: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    #[inline]
    pub fn iterations_remaining(&self) -> i16 {
        self.iterations
    }

    #[inline]
    pub fn last_run(&self) -> u32 {
        self.last_run
    }

    #[inline]
    pub fn args(&self) -> &A {
        &self.args
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == TaskState::Dead
    }

    // wrap-safe: correct across one u32 wrap for intervals <= MAX_INTERVAL_MS.
    // interval 0 (only reachable via set_task_interval) never fires.
    #[inline]
    pub(crate) fn is_due(&self, now: u32) -> bool {
        self.state == TaskState::Active
            && self.iterations != 0
            && self.interval != 0
            && now.wrapping_sub(self.last_run) >= self.interval
    }

    pub(crate) fn pause(&mut self, now: u32) {
        if self.state == TaskState::Active {
            self.elapsed = now.wrapping_sub(self.last_run);
            self.state = TaskState::Paused;
        }
    }

    // picks up where pause left off: the same ms already accrued
    pub(crate) fn resume(&mut self, now: u32) {
        if self.state == TaskState::Paused {
            self.last_run = now.wrapping_sub(self.elapsed);
            self.state = TaskState::Active;
        }
    }

    // nothing accrued either way, so a paused task resumes into a full period
    pub(crate) fn reset_timer(&mut self, now: u32) {
        self.last_run = now;
        self.elapsed = 0;
    }

    // a fire starts a new period, including for a task that paused
    // itself from its own handler
    pub(crate) fn mark_fired(&mut self, now: u32) {
        self.last_run = now;
        self.elapsed = 0;
    }

    pub(crate) fn kill(&mut self) {
        self.state = TaskState::Dead;
    }

    // called after the fire attempt in tick
    pub(crate) fn consume_iteration(&mut self) {
        if self.iterations > 0 {
            self.iterations -= 1;
        }
    }

    pub(crate) fn reap_if_spent(&mut self) {
        if self.iterations == 0 {
            self.state = TaskState::Dead;
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for TaskRecord<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("args", &self.args)
            .field("interval", &self.interval)
            .field("iterations", &self.iterations)
            .field("state", &self.state)
            .field("last_run", &self.last_run)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}
