use serde::{Deserialize, Serialize};

use super::{Model, units::Quantity};
use crate::error::{QueueError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spread {
    StdDev(f64),
    Variance(f64),
}

impl Spread {
    fn raw(self) -> f64 {
        match self {
            Self::StdDev(v) | Self::Variance(v) => v,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::StdDev(_) => "standard deviation",
            Self::Variance(_) => "variance",
        }
    }
}

/// Interarrival or service process as entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum ProcessSpec {
    /// Exponential times (Poisson events).
    Markovian { quantity: Quantity },
    /// Mean plus spread, the spread in the mean's time unit.
    General { quantity: Quantity, spread: Spread },
    /// Uniform times between `min` and `max` minutes.
    Uniform { min: f64, max: f64 },
}

/// First two moments on the per-minute basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub rate: f64,
    pub mean: f64,
    pub variance: f64,
}

impl ProcessSpec {
    pub fn markovian(quantity: Quantity) -> Self {
        Self::Markovian { quantity }
    }

    pub fn is_markovian(&self) -> bool {
        matches!(self, Self::Markovian { .. })
    }

    pub fn moments(&self) -> Moments {
        match *self {
            Self::Markovian { quantity } => {
                let mean = quantity.mean_minutes();
                Moments {
                    rate: quantity.per_minute_rate(),
                    mean,
                    variance: mean * mean,
                }
            }
            Self::General { quantity, spread } => {
                let unit = quantity.unit;
                let variance = match spread {
                    Spread::StdDev(sd) => unit.to_minutes(sd).powi(2),
                    Spread::Variance(v) => unit.to_minutes(unit.to_minutes(v)),
                };
                Moments {
                    rate: quantity.per_minute_rate(),
                    mean: quantity.mean_minutes(),
                    variance,
                }
            }
            Self::Uniform { min, max } => {
                let mean = (min + max) / 2.0;
                Moments {
                    rate: 1.0 / mean,
                    mean,
                    variance: (max - min).powi(2) / 12.0,
                }
            }
        }
    }

    fn check(&self, field: &'static str, errors: &mut Vec<ValidationError>) {
        match *self {
            Self::Markovian { quantity } => {
                if !(quantity.value > 0.0) {
                    errors.push(ValidationError::new(field, "mean/rate must be > 0"));
                }
            }
            Self::General { quantity, spread } => {
                if !(quantity.value > 0.0) {
                    errors.push(ValidationError::new(field, "mean/rate must be > 0"));
                }
                if !(spread.raw() >= 0.0) {
                    errors.push(ValidationError::new(
                        field,
                        format!("{} cannot be negative", spread.label()),
                    ));
                }
            }
            Self::Uniform { min, max } => {
                if !(min >= 0.0) || !(max >= 0.0) {
                    errors.push(ValidationError::new(field, "values cannot be negative"));
                }
                if !(max > min) {
                    errors.push(ValidationError::new(field, "max must be > min"));
                }
            }
        }
    }
}

/// A fully specified analytic query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticInput {
    pub model: Model,
    pub arrival: ProcessSpec,
    pub service: ProcessSpec,
    /// Ignored by the single-server models.
    #[serde(default = "one")]
    pub servers: u32,
}

fn one() -> u32 {
    1
}

impl AnalyticInput {
    pub fn servers(&self) -> u32 {
        if self.model.is_multi_server() {
            self.servers
        } else {
            1
        }
    }

    pub fn validate(&self) -> Result<(), QueueError> {
        let mut errors = Vec::new();

        if self.model.is_multi_server() && self.servers == 0 {
            errors.push(ValidationError::new("servers", "servers must be 1 or more"));
        }

        self.arrival.check("arrival", &mut errors);
        self.service.check("service", &mut errors);

        if self.model.has_markovian_arrivals() && !self.arrival.is_markovian() {
            errors.push(ValidationError::new(
                "arrival",
                format!("{} needs Markovian (Poisson) arrivals", self.model),
            ));
        }
        if self.model.has_markovian_service() && !self.service.is_markovian() {
            errors.push(ValidationError::new(
                "service",
                format!("{} needs Markovian (exponential) service", self.model),
            ));
        }

        QueueError::from_validation(errors)
    }
}
