//! Processing order for a batch of tasks.

use super::Task;

/// Orders tasks by `(priority rank, deadline)`, both ascending.
///
/// The sort is stable, so tasks with equal keys keep their submission order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskPrioritizer;

impl TaskPrioritizer {
    pub fn new() -> Self {
        Self
    }

    /// Return references to `tasks` in processing order.
    pub fn order<'a, I>(&self, tasks: I) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut ordered: Vec<&Task> = tasks.into_iter().collect();
        ordered.sort_by_key(|t| (t.priority.rank(), t.deadline));
        ordered
    }
}
