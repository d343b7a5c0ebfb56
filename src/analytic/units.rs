//! Normalization of rates and means to the per-minute basis the formulas use.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Second,
    #[default]
    Minute,
    Hour,
}

impl TimeUnit {
    /// Events per unit to events per minute.
    pub fn rate_per_minute(self, rate: f64) -> f64 {
        match self {
            Self::Second => rate * 60.0,
            Self::Minute => rate,
            Self::Hour => rate / 60.0,
        }
    }

    /// A duration in this unit, in minutes.
    pub fn to_minutes(self, value: f64) -> f64 {
        match self {
            Self::Second => value / 60.0,
            Self::Minute => value,
            Self::Hour => value * 60.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Second => "sec",
            Self::Minute => "min",
            Self::Hour => "hour",
        })
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(Self::Second),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minute),
            "h" | "hour" | "hours" => Ok(Self::Hour),
            other => Err(format!("unknown time unit `{other}`")),
        }
    }
}

/// Whether an entered value is a rate or a mean time between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    #[default]
    Rate,
    Mean,
}

impl FromStr for QuantityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rate" => Ok(Self::Rate),
            "mean" => Ok(Self::Mean),
            other => Err(format!("expected `rate` or `mean`, got `{other}`")),
        }
    }
}

/// A rate or mean as entered, with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(default)]
    pub kind: QuantityKind,
    #[serde(default)]
    pub unit: TimeUnit,
}

impl Quantity {
    pub fn rate(value: f64, unit: TimeUnit) -> Self {
        Self {
            value,
            kind: QuantityKind::Rate,
            unit,
        }
    }

    pub fn mean(value: f64, unit: TimeUnit) -> Self {
        Self {
            value,
            kind: QuantityKind::Mean,
            unit,
        }
    }

    pub fn per_minute_rate(&self) -> f64 {
        match self.kind {
            QuantityKind::Rate => self.unit.rate_per_minute(self.value),
            QuantityKind::Mean => 1.0 / self.unit.to_minutes(self.value),
        }
    }

    pub fn mean_minutes(&self) -> f64 {
        match self.kind {
            QuantityKind::Rate => 1.0 / self.per_minute_rate(),
            QuantityKind::Mean => self.unit.to_minutes(self.value),
        }
    }
}
