//! Per-job metrics and run-level statistics derived from a finished schedule.
//!
//! Everything here is a pure read of the engine's task table; nothing feeds
//! back into scheduling.

pub mod gantt;
pub mod series;

use average::{Estimate, Mean};
use serde::Serialize;

use crate::{
    core::state::{Priority, Segment, ServerId, Task, TaskId, Ticks},
    sim::arrival::ArrivalDraw,
};
pub use gantt::{ServerTimeline, TimelineSlot, server_timelines};
pub use series::{ServerUsage, TimeSeries};

/// One row of the simulation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: TaskId,
    pub cumulative_probability: f64,
    pub lookup_probability: f64,
    pub inter_arrival: Ticks,
    pub arrival_time: Ticks,
    pub service_time: Ticks,
    pub priority: Option<Priority>,
    pub start_time: Option<Ticks>,
    // None for jobs cut off by a truncated run
    pub end_time: Option<Ticks>,
    pub waiting_time: Option<Ticks>,
    pub turnaround_time: Option<Ticks>,
    pub response_time: Option<Ticks>,
    /// Server of the first segment.
    pub server: Option<ServerId>,
}

impl JobRecord {
    pub fn new(task: &Task, draw: &ArrivalDraw) -> Self {
        let start_time = task.start_time();
        let end_time = if task.is_finished() {
            task.segments.iter().map(|seg| seg.end).max()
        } else {
            None
        };
        let turnaround_time = end_time.map(|end| end - task.arrival_time);

        Self {
            id: task.id,
            cumulative_probability: draw.cumulative_probability,
            lookup_probability: draw.lookup_probability,
            inter_arrival: draw.inter_arrival,
            arrival_time: task.arrival_time,
            service_time: task.required_service,
            priority: task.priority,
            start_time,
            end_time,
            waiting_time: turnaround_time.map(|tat| tat.saturating_sub(task.required_service)),
            turnaround_time,
            response_time: start_time.map(|start| start - task.arrival_time),
            server: task.segments.first().map(|seg| seg.server),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub customers: usize,
    pub completed: usize,
    pub mean_waiting: f64,
    pub mean_turnaround: f64,
    pub mean_response: f64,
    /// Latest segment end.
    pub horizon: Ticks,
    pub servers: Vec<ServerUsage>,
    pub overall_utilization: f64,
    /// Percentage of server capacity left idle.
    pub idle_factor: f64,
}

fn mean(values: impl Iterator<Item = Ticks>) -> f64 {
    values.map(|v| v as f64).collect::<Mean>().estimate()
}

/// Reconstructed view of a run: table rows, averages, series and Gantt data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub records: Vec<JobRecord>,
    pub summary: RunSummary,
    pub series: TimeSeries,
    pub gantt: Vec<ServerTimeline>,
    pub segments: Vec<Vec<Segment>>,
}

impl Timeline {
    pub fn reconstruct(tasks: &[Task], draws: &[ArrivalDraw], num_servers: usize) -> Self {
        assert_eq!(tasks.len(), draws.len(), "One arrival draw per task");

        let records: Vec<JobRecord> = tasks
            .iter()
            .zip(draws)
            .map(|(task, draw)| JobRecord::new(task, draw))
            .collect();

        let horizon = tasks
            .iter()
            .flat_map(|task| task.segments.iter().map(|seg| seg.end))
            .max()
            .unwrap_or(0);

        let series = TimeSeries::sample(tasks, num_servers, horizon);
        let servers = series.server_usage(horizon);
        let total_busy: Ticks = servers.iter().map(|usage| usage.busy_time).sum();
        let overall_utilization = if horizon > 0 {
            total_busy as f64 / (horizon as f64 * num_servers as f64)
        } else {
            0.0
        };

        let completed: Vec<&JobRecord> = records.iter().filter(|r| r.is_complete()).collect();
        let summary = RunSummary {
            customers: records.len(),
            completed: completed.len(),
            mean_waiting: mean(completed.iter().filter_map(|r| r.waiting_time)),
            mean_turnaround: mean(completed.iter().filter_map(|r| r.turnaround_time)),
            mean_response: mean(records.iter().filter_map(|r| r.response_time)),
            horizon,
            servers,
            overall_utilization,
            idle_factor: (1.0 - overall_utilization) * 100.0,
        };

        Self {
            records,
            summary,
            series,
            gantt: server_timelines(tasks, num_servers, horizon),
            segments: tasks.iter().map(|task| task.segments.clone()).collect(),
        }
    }

    /// Jobs without an end time; non-empty only after a truncated run.
    pub fn incomplete_jobs(&self) -> impl Iterator<Item = TaskId> {
        self.records
            .iter()
            .filter(|r| !r.is_complete())
            .map(|r| r.id)
    }
}
