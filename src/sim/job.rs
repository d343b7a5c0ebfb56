use serde::{Deserialize, Serialize};

use crate::core::state::{Priority, Ticks};

pub type JobId = usize;

/// A synthetic customer, fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub service_time: Ticks,
    pub priority: Option<Priority>,
}
