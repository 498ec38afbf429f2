use std::collections::VecDeque;

use crate::ViewTree;

/// Work deferred until the host finishes its current layout pass.
pub type Task = Box<dyn FnOnce(&mut ViewTree)>;

/// FIFO of deferred tasks, drained on the UI thread by
/// [`ViewTree::run_scheduled`]. Boxed non-`Send` closures keep the whole tree
/// pinned to the thread that created it.
#[derive(Default)]
pub struct Scheduler {
    queue: VecDeque<Task>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` and returns its sequence number (for logging only).
    pub fn post(&mut self, task: Task) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push_back(task);
        id
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.queue.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl ViewTree {
    /// Defers `task` until the next [`ViewTree::run_scheduled`].
    pub fn post(&mut self, task: impl FnOnce(&mut ViewTree) + 'static) {
        let id = self.scheduler.post(Box::new(task));
        log::trace!("scheduled task #{id}");
    }

    /// Runs every deferred task in posting order, including tasks posted by
    /// the tasks themselves. Hosts call this once layout has settled.
    pub fn run_scheduled(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop() {
            task(self);
            ran += 1;
        }
        ran
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }
}
