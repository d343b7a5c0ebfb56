use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::state::{ServerId, Task, Ticks};

/// Queue length and per-server busy indicator at each sample point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub times: Vec<Ticks>,
    pub queue_length: Vec<usize>,
    // server_busy[k][i] is 1 when server k is busy at times[i]
    pub server_busy: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerUsage {
    pub server: ServerId,
    pub busy_time: Ticks,
    pub utilization: f64,
}

impl TimeSeries {
    /// Samples at every arrival, start and end instant, plus 0 and `horizon`.
    ///
    /// A job counts as queued from its arrival until its first segment
    /// starts; jobs waiting again after a preemption are not counted.
    pub fn sample(tasks: &[Task], num_servers: usize, horizon: Ticks) -> Self {
        let mut points = BTreeSet::from([0, horizon]);
        for task in tasks {
            points.insert(task.arrival_time);
            if let Some(start) = task.start_time() {
                points.insert(start);
            }
            if let Some(end) = task.completion_time {
                points.insert(end);
            }
        }
        let times: Vec<Ticks> = points.into_iter().collect();

        let queue_length = times
            .iter()
            .map(|&t| {
                tasks
                    .iter()
                    .filter(|task| {
                        task.arrival_time <= t && task.start_time().is_none_or(|start| start > t)
                    })
                    .count()
            })
            .collect();

        let server_busy = (0..num_servers)
            .map(|server| {
                times
                    .iter()
                    .map(|&t| {
                        let busy = tasks.iter().any(|task| {
                            task.segments
                                .iter()
                                .any(|seg| seg.server == server && seg.covers(t))
                        });
                        u8::from(busy)
                    })
                    .collect()
            })
            .collect();

        Self {
            times,
            queue_length,
            server_busy,
        }
    }

    /// Busy time per server, summed over sample intervals that start busy.
    pub fn server_usage(&self, horizon: Ticks) -> Vec<ServerUsage> {
        self.server_busy
            .iter()
            .enumerate()
            .map(|(server, busy)| {
                let busy_time: Ticks = self
                    .times
                    .windows(2)
                    .zip(busy)
                    .filter(|(_, b)| **b == 1)
                    .map(|(w, _)| w[1] - w[0])
                    .sum();
                let utilization = if horizon > 0 {
                    busy_time as f64 / horizon as f64
                } else {
                    0.0
                };
                ServerUsage {
                    server,
                    busy_time,
                    utilization,
                }
            })
            .collect()
    }

    pub fn max_queue_length(&self) -> usize {
        self.queue_length.iter().copied().max().unwrap_or(0)
    }
}
