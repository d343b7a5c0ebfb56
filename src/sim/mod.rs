pub mod arrival;
pub mod driver;
pub mod job;
pub mod run;
pub mod service;

pub use arrival::{ArrivalDraw, PoissonTable, generate_arrivals};
pub use driver::{RunLimits, RunOutcome, Sim, Truncation};
pub use job::{Job, JobId};
pub use run::{SimulationReport, run_jobs, simulate, simulate_with_rng};
pub use service::ServiceDistribution;
