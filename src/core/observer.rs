use rustc_hash::FxHashMap;

use super::state::{EngineCtx, ServerId, TaskId, TaskState};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &EngineCtx) {
        self.step += 1;

        let mut placement: FxHashMap<TaskId, ServerId> = FxHashMap::default();
        for server in &ctx.servers {
            if let Some(task_id) = server.current {
                let task = ctx.task(task_id);
                debug_assert_eq!(
                    task.state,
                    TaskState::Running,
                    "server.current task {task_id} must be Running"
                );
                debug_assert_eq!(
                    task.current_server,
                    Some(server.id),
                    "Task {task_id} metadata current_server mismatch"
                );
                debug_assert!(
                    server.completion > ctx.now,
                    "Server {} holds task {task_id} past its completion",
                    server.id
                );
                let previous = placement.insert(task_id, server.id);
                debug_assert!(
                    previous.is_none(),
                    "Task {task_id} running on servers {previous:?} and {}",
                    server.id
                );
            }
        }

        for (&task_id, _) in ctx.waiting.iter() {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Waiting,
                "Task {task_id} in waiting set must be Waiting"
            );
            debug_assert!(
                !placement.contains_key(&task_id),
                "Waiting task {task_id} must not be on a server"
            );
            debug_assert!(
                task.arrival_time <= ctx.now,
                "Task {task_id} waiting before its arrival"
            );
        }

        for task in &ctx.tasks {
            if task.state == TaskState::Running {
                debug_assert!(
                    placement.contains_key(&task.id),
                    "Running task {} is on no server",
                    task.id
                );
            }
            debug_assert!(
                task.state != TaskState::Finished
                    || task.consumed_service() == task.required_service,
                "Finished task {} consumed {} of {} service",
                task.id,
                task.consumed_service(),
                task.required_service
            );
        }
    }
}
