use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{info, warn};

use super::{
    arrival::{PoissonTable, generate_arrivals},
    driver::{RunOutcome, Sim},
    job::Job,
};
use crate::{
    config::SimulationConfig,
    core::state::Task,
    error::QueueError,
    scheduler::{
        Discipline, FifoScheduler, PreemptivePriqScheduler, PriqScheduler, Scheduler,
    },
    timeline::Timeline,
};

/// Everything one simulation run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub discipline: Discipline,
    pub offered_load: f64,
    pub outcome: RunOutcome,
    pub table: PoissonTable,
    pub jobs: Vec<Job>,
    #[serde(flatten)]
    pub timeline: Timeline,
}

/// Runs `config`, seeding from `config.seed` or from the OS.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationReport, QueueError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    simulate_with_rng(config, &mut rng)
}

pub fn simulate_with_rng<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationReport, QueueError> {
    config.validate()?;

    let offered_load = config.offered_load();
    if offered_load >= 1.0 {
        return Err(QueueError::unstable("simulation", offered_load));
    }

    let table = PoissonTable::new(config.arrival_rate);
    let draws = generate_arrivals(&table, rng);
    let service: Vec<_> = draws.iter().map(|_| config.service.sample(rng)).collect();
    let priority: Vec<_> = draws
        .iter()
        .map(|_| {
            config
                .priority
                .then(|| rng.random_range(1..=config.priority_levels))
        })
        .collect();

    let jobs: Vec<Job> = draws
        .iter()
        .zip(service)
        .zip(priority)
        .enumerate()
        .map(|(id, ((draw, service_time), priority))| Job {
            id,
            arrival_time: draw.arrival_time,
            service_time,
            priority,
        })
        .collect();

    let discipline = config.discipline();
    let (outcome, tasks) = match discipline {
        Discipline::Fcfs => run_jobs::<FifoScheduler>(jobs.clone(), config.servers),
        Discipline::Priority => run_jobs::<PriqScheduler>(jobs.clone(), config.servers),
        Discipline::PreemptivePriority => {
            run_jobs::<PreemptivePriqScheduler>(jobs.clone(), config.servers)
        }
    };

    let timeline = Timeline::reconstruct(&tasks, &draws, config.servers);
    if !outcome.is_complete() {
        warn!(
            incomplete = timeline.incomplete_jobs().count(),
            "simulation stopped before every job finished"
        );
    }
    info!(
        customers = timeline.summary.customers,
        mean_waiting = timeline.summary.mean_waiting,
        mean_turnaround = timeline.summary.mean_turnaround,
        utilization = timeline.summary.overall_utilization,
        "simulation finished"
    );

    Ok(SimulationReport {
        discipline,
        offered_load,
        outcome,
        table,
        jobs,
        timeline,
    })
}

/// Schedules a fixed job list under discipline `S`.
pub fn run_jobs<S: Scheduler>(jobs: Vec<Job>, num_servers: usize) -> (RunOutcome, Vec<Task>) {
    let mut sim = Sim::<S>::new(jobs, num_servers);
    let outcome = sim.run();
    (outcome, sim.into_tasks())
}
