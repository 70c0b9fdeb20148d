// Insertion-ordered task table
//
// Contiguous storage, mark-then-compact deletion. Nothing is ever
// removed mid-walk: kills only flip state to Dead, and the scheduler
// compacts once after its dispatch pass. Appends during the pass land
// past the walk bound and wait for the next tick.

extern crate alloc;

use alloc::vec::Vec;

use super::config::Config;
use super::error::AddTaskError;
use super::ident::IdAllocator;
use super::task::{Handler, MAX_INTERVAL_MS, TaskId, TaskRecord, TaskSpec};

pub struct TaskTable<A> {
    records: Vec<TaskRecord<A>>,
    ids: IdAllocator,
    max_tasks: u8,
}

impl<A> TaskTable<A> {
    pub fn new(config: Config) -> Self {
        let records = if config.preallocate {
            Vec::with_capacity(config.max_tasks as usize)
        } else {
            Vec::new()
        };
        Self {
            records,
            ids: IdAllocator::new(),
            max_tasks: config.max_tasks,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord<A>> {
        self.records.iter()
    }

    // linear: at most 255 records
    pub fn get(&self, id: TaskId) -> Option<&TaskRecord<A>> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> Option<&mut TaskRecord<A>> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    #[inline]
    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn insert(
        &mut self,
        handler: Handler<A>,
        args: A,
        spec: TaskSpec,
        now: u32,
    ) -> Result<TaskId, AddTaskError> {
        if spec.interval == 0 {
            log::warn!("jockey: rejected task with zero interval");
            return Err(AddTaskError::ZeroInterval);
        }
        if self.records.len() >= self.max_tasks as usize {
            log::warn!("jockey: task limit ({}) reached", self.max_tasks);
            return Err(AddTaskError::CapacityReached);
        }

        let records = &self.records;
        let Some(id) = self.ids.allocate(|c| records.iter().any(|r| r.id == c)) else {
            log::warn!("jockey: no free task id");
            return Err(AddTaskError::IdsExhausted);
        };

        if spec.interval > MAX_INTERVAL_MS {
            log::warn!(
                "jockey: task {} interval {} ms exceeds wrap-safe limit",
                id,
                spec.interval
            );
        }
        if spec.iterations == 0 {
            log::warn!("jockey: task {} admitted with 0 iterations, dies next tick", id);
        }

        self.records
            .push(TaskRecord::new(id, handler, args, &spec, now));
        log::debug!(
            "jockey: task {} added, every {} ms, offset {} ms, iterations {}",
            id,
            spec.interval,
            spec.offset_start,
            spec.iterations
        );
        Ok(id)
    }

    pub(crate) fn kill_all(&mut self) {
        for rec in self.records.iter_mut() {
            rec.kill();
        }
    }

    // index access for the dispatch walk; indices are stable until sweep_dead
    #[inline]
    pub(crate) fn at_mut(&mut self, index: usize) -> &mut TaskRecord<A> {
        &mut self.records[index]
    }

    /// Drop every Dead record, keeping the survivors in order.
    /// Returns how many were removed.
    pub(crate) fn sweep_dead(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.is_dead());
        let removed = before - self.records.len();
        if removed > 0 {
            log::debug!("jockey: swept {} dead task(s), {} left", removed, self.records.len());
        }
        removed
    }
}

impl<A> Default for TaskTable<A> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
