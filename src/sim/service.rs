use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::state::Ticks;

/// Service-time family of a simulated station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ServiceDistribution {
    Exponential { mean: f64 },
    Uniform { min: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
}

// Uniform on (0, 1], safe to take the log of
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Rounds to whole ticks, never below one.
pub fn round_service(raw: f64) -> Ticks {
    raw.round().max(1.0) as Ticks
}

impl ServiceDistribution {
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Exponential { mean } | Self::Normal { mean, .. } => mean,
            Self::Uniform { min, max } => (min + max) / 2.0,
        }
    }

    pub fn variance(&self) -> f64 {
        match *self {
            Self::Exponential { mean } => mean * mean,
            Self::Uniform { min, max } => (max - min).powi(2) / 12.0,
            Self::Normal { std_dev, .. } => std_dev * std_dev,
        }
    }

    pub fn sample_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Exponential { mean } => -open_unit(rng).ln() * mean,
            Self::Uniform { min, max } => min + (max - min) * rng.random::<f64>(),
            // Box-Muller
            Self::Normal { mean, std_dev } => {
                let u1 = open_unit(rng);
                let u2 = rng.random::<f64>();
                mean + std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
            }
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Ticks {
        round_service(self.sample_raw(rng))
    }
}
