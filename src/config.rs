//! Explicit per-run configuration for the simulation path.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    core::state::Priority,
    error::{QueueError, ValidationError},
    scheduler::Discipline,
    sim::service::ServiceDistribution,
};

pub const DEFAULT_PRIORITY_LEVELS: Priority = 3;

/// Largest accepted service parameter, in ticks. Keeps every sampled
/// schedule far inside the `u64` clock.
pub const MAX_SERVICE_TIME: f64 = 1e9;

fn default_priority_levels() -> Priority {
    DEFAULT_PRIORITY_LEVELS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Mean of the Poisson table that drives arrivals.
    pub arrival_rate: f64,
    pub service: ServiceDistribution,
    pub servers: usize,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub preemption: bool,
    /// Priorities are drawn from `1..=priority_levels`.
    #[serde(default = "default_priority_levels")]
    pub priority_levels: Priority,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate: 2.0,
            service: ServiceDistribution::Exponential { mean: 3.0 },
            servers: 1,
            priority: false,
            preemption: false,
            priority_levels: DEFAULT_PRIORITY_LEVELS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn discipline(&self) -> Discipline {
        Discipline::from_flags(self.priority, self.preemption)
    }

    /// Load figure `λ / (s·μ)`, with μ the service parameter as entered.
    pub fn offered_load(&self) -> f64 {
        self.arrival_rate / (self.servers as f64 * self.service.mean())
    }

    pub fn validate(&self) -> Result<(), QueueError> {
        let mut errors = Vec::new();

        if !(self.arrival_rate > 0.0) {
            errors.push(ValidationError::new(
                "arrival_rate",
                "λ (arrival rate) must be greater than zero",
            ));
        }
        if self.servers == 0 {
            errors.push(ValidationError::new(
                "servers",
                "number of servers must be at least 1",
            ));
        }

        match self.service {
            ServiceDistribution::Exponential { mean } => {
                if !(mean > 0.0) {
                    errors.push(ValidationError::new(
                        "service.mean",
                        "mean service time must be greater than zero",
                    ));
                }
            }
            ServiceDistribution::Normal { mean, std_dev } => {
                if !(mean > 0.0) {
                    errors.push(ValidationError::new(
                        "service.mean",
                        "mean service time must be greater than zero",
                    ));
                }
                if !(std_dev >= 0.0) {
                    errors.push(ValidationError::new(
                        "service.std_dev",
                        "standard deviation cannot be negative",
                    ));
                }
            }
            ServiceDistribution::Uniform { min, max } => {
                if !(min >= 0.0) || !(max >= 0.0) {
                    errors.push(ValidationError::new(
                        "service.min",
                        "uniform bounds cannot be negative",
                    ));
                }
                if !(max > min) {
                    errors.push(ValidationError::new(
                        "service.max",
                        "maximum service time must be greater than the minimum",
                    ));
                }
            }
        }

        let largest = match self.service {
            ServiceDistribution::Exponential { mean } => mean,
            ServiceDistribution::Uniform { max, .. } => max,
            ServiceDistribution::Normal { mean, std_dev } => mean.max(std_dev),
        };
        if largest > MAX_SERVICE_TIME {
            errors.push(ValidationError::new(
                "service",
                format!("service parameters must not exceed {MAX_SERVICE_TIME:e} time units"),
            ));
        }

        if self.preemption && !self.priority {
            errors.push(ValidationError::new(
                "preemption",
                "preemption requires priority scheduling",
            ));
        }
        if self.priority && self.priority_levels == 0 {
            errors.push(ValidationError::new(
                "priority_levels",
                "at least one priority level is required",
            ));
        }

        QueueError::from_validation(errors)
    }
}
