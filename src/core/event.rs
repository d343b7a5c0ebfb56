use crate::core::{ServerId, TaskId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedCoreEvent {
    TaskArrived {
        task: TaskId,
    },
    TaskStarted {
        task: TaskId,
        server: ServerId,
        until: Ticks,
    },
    // Running task gave its server up to a strictly higher-priority one
    TaskPreempted {
        task: TaskId,
        server: ServerId,
        by: TaskId,
        remaining: Ticks,
    },
    TaskCompleted {
        task: TaskId,
        server: ServerId,
    },
    // Server idle even after dispatch
    ServerIdle {
        server: ServerId,
    },
}
