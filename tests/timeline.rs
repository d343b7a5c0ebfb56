use queue_model::{
    Job,
    scheduler::{FifoScheduler, PreemptivePriqScheduler},
    sim::{ArrivalDraw, RunLimits, RunOutcome, Sim, Truncation, run_jobs},
    timeline::{Timeline, TimelineSlot},
};

fn draws_for(jobs: &[Job]) -> Vec<ArrivalDraw> {
    let mut previous = 0;
    jobs.iter()
        .map(|job| {
            let draw = ArrivalDraw {
                cumulative_probability: 0.0,
                lookup_probability: 0.0,
                inter_arrival: job.arrival_time - previous,
                arrival_time: job.arrival_time,
            };
            previous = job.arrival_time;
            draw
        })
        .collect()
}

fn slot(task: Option<usize>, start: u64, end: u64) -> TimelineSlot {
    TimelineSlot { task, start, end }
}

// job0 0..3, job1 3..5, idle 5..8, job2 8..9
fn fcfs_with_gap() -> Timeline {
    let jobs = vec![
        Job {
            id: 0,
            arrival_time: 0,
            service_time: 3,
            priority: None,
        },
        Job {
            id: 1,
            arrival_time: 1,
            service_time: 2,
            priority: None,
        },
        Job {
            id: 2,
            arrival_time: 8,
            service_time: 1,
            priority: None,
        },
    ];
    let draws = draws_for(&jobs);
    let (outcome, tasks) = run_jobs::<FifoScheduler>(jobs, 1);
    assert!(outcome.is_complete());
    Timeline::reconstruct(&tasks, &draws, 1)
}

#[test]
fn per_job_metrics() {
    let timeline = fcfs_with_gap();
    let waits: Vec<_> = timeline.records.iter().map(|r| r.waiting_time).collect();
    let tats: Vec<_> = timeline.records.iter().map(|r| r.turnaround_time).collect();
    let responses: Vec<_> = timeline.records.iter().map(|r| r.response_time).collect();

    assert_eq!(waits, [Some(0), Some(2), Some(0)]);
    assert_eq!(tats, [Some(3), Some(4), Some(1)]);
    assert_eq!(responses, [Some(0), Some(2), Some(0)]);
    assert!(timeline.records.iter().all(|r| r.server == Some(0)));
    assert_eq!(timeline.incomplete_jobs().count(), 0);
}

#[test]
fn summary_covers_the_whole_run() {
    let summary = fcfs_with_gap().summary;

    assert_eq!(summary.customers, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.horizon, 9);
    assert!((summary.mean_waiting - 2.0 / 3.0).abs() < 1e-12);
    assert!((summary.mean_turnaround - 8.0 / 3.0).abs() < 1e-12);
    assert_eq!(summary.servers[0].busy_time, 6);
    assert!((summary.overall_utilization - 6.0 / 9.0).abs() < 1e-12);
    assert!((summary.idle_factor - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn series_samples_every_event_instant() {
    let series = fcfs_with_gap().series;

    assert_eq!(series.times, [0, 1, 3, 5, 8, 9]);
    assert_eq!(series.queue_length, [0, 1, 0, 0, 0, 0]);
    assert_eq!(series.server_busy, [vec![1, 1, 1, 0, 1, 0]]);
    assert_eq!(series.max_queue_length(), 1);
}

#[test]
fn gantt_fills_idle_gaps() {
    let gantt = fcfs_with_gap().gantt;

    assert_eq!(gantt.len(), 1);
    assert_eq!(
        gantt[0].slots,
        [
            slot(Some(0), 0, 3),
            slot(Some(1), 3, 5),
            slot(None, 5, 8),
            slot(Some(2), 8, 9),
        ]
    );
    assert_eq!(gantt[0].busy_time(), 6);
}

fn urgent_arrival() -> Vec<Job> {
    vec![
        Job {
            id: 0,
            arrival_time: 0,
            service_time: 4,
            priority: Some(2),
        },
        Job {
            id: 1,
            arrival_time: 2,
            service_time: 1,
            priority: Some(1),
        },
    ]
}

#[test]
fn gantt_keeps_preempted_pieces_apart() {
    let jobs = urgent_arrival();
    let draws = draws_for(&jobs);
    let (_, tasks) = run_jobs::<PreemptivePriqScheduler>(jobs, 1);
    let timeline = Timeline::reconstruct(&tasks, &draws, 1);

    assert_eq!(
        timeline.gantt[0].slots,
        [slot(Some(0), 0, 2), slot(Some(1), 2, 3), slot(Some(0), 3, 5)]
    );
    assert_eq!(timeline.segments[0].len(), 2);
    assert_eq!(timeline.records[0].waiting_time, Some(1));
    assert_eq!(timeline.records[0].response_time, Some(0));
    // Re-queued time after a preemption is not sampled
    assert_eq!(timeline.series.max_queue_length(), 0);
}

#[test]
fn preempted_job_can_resume_on_another_server() {
    let jobs = urgent_arrival();
    let draws = draws_for(&jobs);
    let (_, tasks) = run_jobs::<PreemptivePriqScheduler>(jobs, 2);
    let timeline = Timeline::reconstruct(&tasks, &draws, 2);

    // Preemption runs before dispatch, so server 0 is taken even though
    // server 1 is idle; the displaced job moves to server 1 at once.
    assert_eq!(
        timeline.gantt[0].slots,
        [slot(Some(0), 0, 2), slot(Some(1), 2, 3), slot(None, 3, 4)]
    );
    assert_eq!(
        timeline.gantt[1].slots,
        [slot(None, 0, 2), slot(Some(0), 2, 4)]
    );
    assert_eq!(timeline.records[0].server, Some(0));
    assert_eq!(timeline.records[0].waiting_time, Some(0));
    assert_eq!(timeline.summary.servers[0].busy_time, 3);
    assert_eq!(timeline.summary.servers[1].busy_time, 2);
}

fn cut_short(jobs: Vec<Job>, limits: RunLimits) -> (RunOutcome, Timeline) {
    let draws = draws_for(&jobs);
    let mut sim = Sim::<FifoScheduler>::with_limits(jobs, 1, limits);
    let outcome = sim.run();
    (outcome, Timeline::reconstruct(&sim.into_tasks(), &draws, 1))
}

#[test]
fn step_limit_leaves_jobs_unfinished() {
    let jobs = vec![
        Job {
            id: 0,
            arrival_time: 0,
            service_time: 3,
            priority: None,
        },
        Job {
            id: 1,
            arrival_time: 0,
            service_time: 3,
            priority: None,
        },
    ];
    let limits = RunLimits {
        max_steps: 1,
        horizon: 100,
    };
    let (outcome, timeline) = cut_short(jobs, limits);

    assert_eq!(
        outcome,
        RunOutcome::Truncated {
            steps: 1,
            reason: Truncation::StepLimit { limit: 1 },
        }
    );
    assert_eq!(timeline.records[0].start_time, Some(0));
    assert!(timeline.records.iter().all(|r| r.end_time.is_none()));
    assert!(timeline.records.iter().all(|r| r.turnaround_time.is_none()));
    assert_eq!(timeline.incomplete_jobs().collect::<Vec<_>>(), [0, 1]);
    assert_eq!(timeline.summary.completed, 0);
}

#[test]
fn horizon_stops_before_the_next_event() {
    let jobs = vec![Job {
        id: 0,
        arrival_time: 0,
        service_time: 3,
        priority: None,
    }];
    let limits = RunLimits {
        max_steps: 100,
        horizon: 2,
    };
    let (outcome, timeline) = cut_short(jobs, limits);

    assert!(matches!(
        outcome,
        RunOutcome::Truncated {
            reason: Truncation::Horizon { horizon: 2 },
            ..
        }
    ));
    assert!(!outcome.is_complete());
    assert_eq!(timeline.records[0].end_time, None);
    assert_eq!(timeline.incomplete_jobs().collect::<Vec<_>>(), [0]);
}
