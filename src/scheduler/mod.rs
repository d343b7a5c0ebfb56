pub mod fifo;
pub mod priq;

use serde::{Deserialize, Serialize};

use crate::core::state::{Task, WaitKey};
pub use fifo::FifoScheduler;
pub use priq::{PreemptivePriqScheduler, PriqScheduler};

/// Queue discipline selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Fcfs,
    Priority,
    PreemptivePriority,
}

impl Discipline {
    pub fn from_flags(priority: bool, preemption: bool) -> Self {
        match (priority, preemption) {
            (false, _) => Self::Fcfs,
            (true, false) => Self::Priority,
            (true, true) => Self::PreemptivePriority,
        }
    }
}

pub trait Scheduler {
    const NAME: &'static str;

    fn init() -> Self;

    /// Key under which `task` sits in the waiting set.
    fn wait_key(&self, task: &Task) -> WaitKey;

    /// Whether `waiting` should take the server currently running `running`.
    fn should_preempt(&self, _running: &Task, _waiting: &Task) -> bool {
        false
    }
}
