pub mod analytic;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod sim;
pub mod timeline;

pub use analytic::{AnalyticInput, Metrics, Model, solve};
pub use config::SimulationConfig;
pub use core::SchedCoreEvent;
pub use error::{QueueError, ValidationError};
pub use scheduler::{Discipline, Scheduler};
pub use sim::{Job, Sim, SimulationReport, simulate, simulate_with_rng};
