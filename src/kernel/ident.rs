// Task id allocation
//
// 8-bit ids, 0 reserved. A wrapping hint avoids a free list: search
// starts where the last allocation left off, so recently freed ids
// are not handed out again straight away.

use super::task::TaskId;

#[derive(Debug, Clone, Copy)]
pub struct IdAllocator {
    next: TaskId,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self {
            next: TaskId::FIRST,
        }
    }

    /// Next id for which `in_use` is false, or `None` after a full lap.
    pub fn allocate(&mut self, mut in_use: impl FnMut(TaskId) -> bool) -> Option<TaskId> {
        let start = self.next;
        let mut candidate = start;

        loop {
            if !in_use(candidate) {
                self.next = candidate.wrapping_next();
                return Some(candidate);
            }
            candidate = candidate.wrapping_next();
            if candidate == start {
                return None;
            }
        }
    }

    pub fn hint(&self) -> TaskId {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
