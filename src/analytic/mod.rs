//! Closed-form steady-state metrics for single-station queueing models.
//!
//! All inputs are normalized to a per-minute basis before any formula runs,
//! so rates come out per minute and times in minutes.

pub mod input;
pub mod models;
pub mod units;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueueError;
pub use input::{AnalyticInput, Moments, ProcessSpec, Spread};
pub use units::{Quantity, QuantityKind, TimeUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "M/M/1")]
    MM1,
    #[serde(rename = "M/M/s")]
    MMs,
    #[serde(rename = "M/G/1")]
    MG1,
    #[serde(rename = "M/G/s")]
    MGs,
    #[serde(rename = "G/G/1")]
    GG1,
    #[serde(rename = "G/G/s")]
    GGs,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Self::MM1,
        Self::MMs,
        Self::MG1,
        Self::MGs,
        Self::GG1,
        Self::GGs,
    ];

    pub fn is_multi_server(self) -> bool {
        matches!(self, Self::MMs | Self::MGs | Self::GGs)
    }

    pub fn has_markovian_arrivals(self) -> bool {
        !matches!(self, Self::GG1 | Self::GGs)
    }

    pub fn has_markovian_service(self) -> bool {
        matches!(self, Self::MM1 | Self::MMs)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MM1 => "M/M/1",
            Self::MMs => "M/M/s",
            Self::MG1 => "M/G/1",
            Self::MGs => "M/G/s",
            Self::GG1 => "G/G/1",
            Self::GGs => "G/G/s",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '/')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|model| model.name().replace('/', "").to_ascii_lowercase() == key)
            .ok_or_else(|| format!("unknown model `{s}`"))
    }
}

/// Steady-state performance of one model. Rates per minute, times in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub model: Model,
    pub rho: f64,
    pub p0: f64,
    pub l: f64,
    pub lq: f64,
    pub w: f64,
    pub wq: f64,
    pub ca2: f64,
    pub cs2: f64,
}

/// Validates `input`, then evaluates its model.
pub fn solve(input: &AnalyticInput) -> Result<Metrics, QueueError> {
    input.validate()?;

    let arrival = input.arrival.moments();
    let service = input.service.moments();
    let lambda = arrival.rate;
    let s = input.servers();
    debug!(
        model = %input.model,
        lambda,
        mean_service = service.mean,
        servers = s,
        "solving"
    );

    match input.model {
        Model::MM1 => models::mm1(lambda, service.rate),
        Model::MMs => models::mms(lambda, service.rate, s),
        Model::MG1 => models::mg1(lambda, service.mean, service.variance),
        Model::MGs => models::mgs(lambda, service.mean, service.variance, s),
        Model::GG1 => models::gg1(lambda, arrival.variance, service.mean, service.variance),
        Model::GGs => models::ggs(
            lambda,
            arrival.variance,
            service.mean,
            service.variance,
            s,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_round_trip() {
        for model in Model::ALL {
            assert_eq!(model.name().parse::<Model>(), Ok(model));
        }
        assert_eq!("mms".parse::<Model>(), Ok(Model::MMs));
        assert_eq!("GG1".parse::<Model>(), Ok(Model::GG1));
        assert!("mm2".parse::<Model>().is_err());
    }

    #[test]
    fn solve_normalizes_units() {
        let input = AnalyticInput {
            model: Model::MM1,
            arrival: ProcessSpec::markovian(Quantity::rate(120.0, TimeUnit::Hour)),
            service: ProcessSpec::markovian(Quantity::mean(20.0, TimeUnit::Second)),
            servers: 1,
        };
        let metrics = solve(&input).unwrap();
        assert!((metrics.rho - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.w - 1.0).abs() < 1e-9);
    }

    #[test]
    fn solve_refuses_invalid_input_before_stability() {
        let input = AnalyticInput {
            model: Model::MM1,
            arrival: ProcessSpec::markovian(Quantity::rate(-1.0, TimeUnit::Minute)),
            service: ProcessSpec::markovian(Quantity::rate(0.5, TimeUnit::Minute)),
            servers: 1,
        };
        assert!(matches!(solve(&input), Err(QueueError::Validation(_))));
    }
}
