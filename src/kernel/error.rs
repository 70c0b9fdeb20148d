use core::fmt;

use super::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddTaskError {
    /// Interval of 0 ms; the task could never be scheduled sensibly
    ZeroInterval,
    /// The table already holds `Config::max_tasks` records
    CapacityReached,
    /// Every id 1..=255 is taken
    IdsExhausted,
}

impl fmt::Display for AddTaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddTaskError::ZeroInterval => write!(f, "interval must be non-zero"),
            AddTaskError::CapacityReached => write!(f, "task limit reached"),
            AddTaskError::IdsExhausted => write!(f, "no free task id"),
        }
    }
}

impl core::error::Error for AddTaskError {}

impl AddTaskError {
    /// Collapse a registration result to the raw id byte, 0 on failure.
    /// For C-style callers and diagnostics that want the sentinel form.
    pub fn raw_id(result: Result<TaskId, AddTaskError>) -> u8 {
        result.map_or(0, TaskId::get)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_reads_like_a_sentence() {
        assert_eq!(AddTaskError::ZeroInterval.to_string(), "interval must be non-zero");
        assert_eq!(AddTaskError::CapacityReached.to_string(), "task limit reached");
        assert_eq!(AddTaskError::IdsExhausted.to_string(), "no free task id");
    }

    #[test]
    fn raw_id_uses_zero_sentinel() {
        assert_eq!(AddTaskError::raw_id(Err(AddTaskError::ZeroInterval)), 0);
        assert_eq!(AddTaskError::raw_id(Ok(TaskId::new(9).unwrap())), 9);
    }
}
