use serde::Serialize;
use tracing::{debug, trace, warn};

use super::job::{Job, JobId};
use crate::{
    core::{
        driver::SchedCore,
        event::SchedCoreEvent,
        state::{Task, Ticks},
    },
    scheduler::Scheduler,
};

// Slack added past the last possible completion before a run is cut off
pub const HORIZON_MARGIN: Ticks = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Truncation {
    StepLimit { limit: u64 },
    Horizon { horizon: Ticks },
    // Work remains but no arrival or completion is pending
    Stalled { at: Ticks },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { steps: u64 },
    Truncated { steps: u64, reason: Truncation },
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Upper bounds that guarantee [`Sim::run`] terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub max_steps: u64,
    pub horizon: Ticks,
}

impl RunLimits {
    // Every visited instant is an arrival instant or a segment end. There are
    // n final segments, plus at most one preempted segment per server per
    // arrival instant.
    pub fn derive(jobs: &[Job], num_servers: usize) -> Self {
        let n = jobs.len() as u64;
        let max_arrival = jobs.iter().map(|job| job.arrival_time).max().unwrap_or(0);
        let total_service = jobs
            .iter()
            .map(|job| job.service_time)
            .fold(0, Ticks::saturating_add);

        Self {
            max_steps: n
                .saturating_mul(num_servers as u64 + 2)
                .saturating_add(1),
            horizon: max_arrival
                .saturating_add(total_service)
                .saturating_add(HORIZON_MARGIN),
        }
    }
}

pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    pub jobs: Vec<Job>,
    // Job indices sorted by arrival time
    arrival_order: Vec<JobId>,
    job_cursor: usize,
    limits: RunLimits,
    steps: u64,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(jobs: Vec<Job>, num_servers: usize) -> Self {
        let limits = RunLimits::derive(&jobs, num_servers);
        Self::with_limits(jobs, num_servers, limits)
    }

    /// Like [`Sim::new`], but [`Sim::run`] stops at `limits` instead of the
    /// bounds derived from the workload.
    pub fn with_limits(jobs: Vec<Job>, num_servers: usize, limits: RunLimits) -> Self {
        assert!(num_servers > 0, "Simulation requires at least one server");

        let mut core = SchedCore::<S>::new(num_servers);
        for (index, job) in jobs.iter().enumerate() {
            assert_eq!(job.id, index, "Job ids must match their position");
            let task = core
                .ctx
                .create_task(job.arrival_time, job.service_time, job.priority);
            debug_assert_eq!(task, job.id, "TaskId must match JobId");
        }

        let mut arrival_order: Vec<JobId> = (0..jobs.len()).collect();
        arrival_order.sort_by_key(|&id| (jobs[id].arrival_time, id));

        Self {
            core,
            jobs,
            arrival_order,
            job_cursor: 0,
            limits,
            steps: 0,
        }
    }

    /// Processes the current instant: release, admit, preempt, dispatch.
    pub fn step(&mut self) -> Vec<SchedCoreEvent> {
        let mut events = self.core.release();
        self.handle_arrivals(&mut events);
        events.extend(self.core.schedule());
        self.steps += 1;
        events
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SchedCoreEvent>) {
        let now = self.core.now();
        // Contiguous, since arrival_order is sorted
        while let Some(&job) = self.arrival_order.get(self.job_cursor) {
            if self.jobs[job].arrival_time > now {
                break;
            }
            events.push(self.core.wake_task(job));
            self.job_cursor += 1;
        }
    }

    pub fn next_arrival(&self) -> Option<Ticks> {
        self.arrival_order
            .get(self.job_cursor)
            .map(|&job| self.jobs[job].arrival_time)
    }

    /// Earliest pending arrival or completion.
    pub fn next_instant(&self) -> Option<Ticks> {
        match (self.next_arrival(), self.core.next_completion()) {
            (Some(a), Some(c)) => Some(a.min(c)),
            (a, c) => a.or(c),
        }
    }

    /// All jobs admitted, nothing waiting, every server idle.
    pub fn is_finished(&self) -> bool {
        self.job_cursor == self.arrival_order.len() && self.core.is_drained()
    }

    pub fn run(&mut self) -> RunOutcome {
        debug!(
            scheduler = S::NAME,
            jobs = self.jobs.len(),
            servers = self.core.ctx.servers.len(),
            max_steps = self.limits.max_steps,
            horizon = self.limits.horizon,
            "starting run"
        );

        loop {
            let now = self.core.now();
            for event in self.step() {
                trace!(t = now, ?event);
            }

            if self.is_finished() {
                return RunOutcome::Completed { steps: self.steps };
            }

            let reason = if self.steps >= self.limits.max_steps {
                Some(Truncation::StepLimit {
                    limit: self.limits.max_steps,
                })
            } else {
                match self.next_instant() {
                    None => Some(Truncation::Stalled { at: now }),
                    Some(next) if next > self.limits.horizon => Some(Truncation::Horizon {
                        horizon: self.limits.horizon,
                    }),
                    Some(next) => {
                        self.core.advance_to(next);
                        None
                    }
                }
            };

            if let Some(reason) = reason {
                warn!(?reason, steps = self.steps, "run truncated");
                return RunOutcome::Truncated {
                    steps: self.steps,
                    reason,
                };
            }
        }
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.ctx.tasks.iter().all(Task::is_finished)
    }

    pub fn jobs_map<T>(&self, f: impl Fn(&Task) -> T) -> impl Iterator<Item = T> {
        self.core.ctx.tasks.iter().map(f)
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.core.ctx.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{FifoScheduler, PreemptivePriqScheduler, PriqScheduler};

    fn job(id: JobId, arrival_time: Ticks, service_time: Ticks, priority: Option<u32>) -> Job {
        Job {
            id,
            arrival_time,
            service_time,
            priority,
        }
    }

    #[test]
    fn single_server_fcfs_serves_in_arrival_order() {
        let jobs = vec![
            job(0, 0, 3, None),
            job(1, 1, 2, None),
            job(2, 1, 1, None),
            job(3, 10, 2, None),
        ];
        let mut sim = Sim::<FifoScheduler>::new(jobs, 1);
        assert!(sim.run().is_complete());

        let spans: Vec<_> = sim
            .jobs_map(|t| (t.start_time().unwrap(), t.completion_time.unwrap()))
            .collect();
        assert_eq!(spans, vec![(0, 3), (3, 5), (5, 6), (10, 12)]);
    }

    #[test]
    fn freed_server_takes_best_waiting_priority() {
        let jobs = vec![
            job(0, 0, 4, Some(2)),
            job(1, 1, 1, Some(3)),
            job(2, 2, 1, Some(1)),
        ];
        let mut sim = Sim::<PriqScheduler>::new(jobs, 1);
        assert!(sim.run().is_complete());

        let starts: Vec<_> = sim.jobs_map(|t| t.start_time().unwrap()).collect();
        assert_eq!(starts, vec![0, 5, 4]);
    }

    #[test]
    fn preempted_job_resumes_with_remaining_work() {
        let jobs = vec![job(0, 0, 5, Some(2)), job(1, 2, 2, Some(1))];
        let mut sim = Sim::<PreemptivePriqScheduler>::new(jobs, 1);
        assert!(sim.run().is_complete());

        let tasks = sim.into_tasks();
        let segments: Vec<_> = tasks[0].segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(segments, vec![(0, 2), (4, 7)]);
        assert_eq!(tasks[1].segments[0].start, 2);
        assert_eq!(tasks[0].consumed_service(), 5);
    }

    #[test]
    fn derived_limits_cover_the_workload() {
        let jobs = vec![job(0, 0, 3, None), job(1, 4, 2, None)];
        let limits = RunLimits::derive(&jobs, 2);
        assert_eq!(limits.max_steps, 2 + 2 * 3 + 1);
        assert_eq!(limits.horizon, 4 + 5 + HORIZON_MARGIN);
    }

    #[test]
    fn derived_limits_saturate_instead_of_wrapping() {
        let jobs = vec![job(0, 5, Ticks::MAX - 1, None), job(1, 6, Ticks::MAX / 2, None)];
        let limits = RunLimits::derive(&jobs, 1);
        assert_eq!(limits.horizon, Ticks::MAX);
        assert_eq!(limits.max_steps, 2 * 3 + 1);
    }

    #[test]
    fn step_limit_stops_the_run() {
        let jobs = vec![job(0, 0, 3, None), job(1, 0, 3, None)];
        let limits = RunLimits {
            max_steps: 1,
            horizon: 100,
        };
        let mut sim = Sim::<FifoScheduler>::with_limits(jobs, 1, limits);

        assert_eq!(
            sim.run(),
            RunOutcome::Truncated {
                steps: 1,
                reason: Truncation::StepLimit { limit: 1 },
            }
        );
        assert!(!sim.all_jobs_completed());
        assert_eq!(sim.limits(), limits);
    }

    #[test]
    fn empty_population_completes_immediately() {
        let mut sim = Sim::<FifoScheduler>::new(Vec::new(), 1);
        assert_eq!(sim.run(), RunOutcome::Completed { steps: 1 });
    }
}
