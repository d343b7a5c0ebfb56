use super::{Scheduler, Task, WaitKey};

/// First come, first served; arrival order only.
pub struct FifoScheduler;

impl Scheduler for FifoScheduler {
    const NAME: &'static str = "fcfs";

    fn init() -> Self {
        Self
    }

    fn wait_key(&self, task: &Task) -> WaitKey {
        WaitKey::new(0, task.arrival_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineCtx;

    #[test]
    fn ignores_priority_classes() {
        let mut ctx = EngineCtx::new(1);
        let low = ctx.create_task(0, 1, Some(3));
        let high = ctx.create_task(1, 1, Some(1));
        let sched = FifoScheduler::init();

        assert!(sched.wait_key(ctx.task(low)) > sched.wait_key(ctx.task(high)));
        assert!(!sched.should_preempt(ctx.task(low), ctx.task(high)));
    }
}
