use super::{Scheduler, Task, WaitKey};

fn priority_key(task: &Task) -> WaitKey {
    WaitKey::new(task.priority_class(), task.arrival_time)
}

/// Smallest priority class first, then arrival order. Running tasks are never
/// interrupted.
pub struct PriqScheduler;

impl Scheduler for PriqScheduler {
    const NAME: &'static str = "priority";

    fn init() -> Self {
        Self
    }

    fn wait_key(&self, task: &Task) -> WaitKey {
        priority_key(task)
    }
}

/// Same ordering as [`PriqScheduler`], but a waiting task with a strictly
/// smaller priority class takes the server from a running one.
pub struct PreemptivePriqScheduler;

impl Scheduler for PreemptivePriqScheduler {
    const NAME: &'static str = "preemptive-priority";

    fn init() -> Self {
        Self
    }

    fn wait_key(&self, task: &Task) -> WaitKey {
        priority_key(task)
    }

    fn should_preempt(&self, running: &Task, waiting: &Task) -> bool {
        waiting.priority_class() < running.priority_class()
    }
}
