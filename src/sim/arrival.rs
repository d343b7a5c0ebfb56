//! Synthetic arrival process built from a truncated Poisson table.
//!
//! The table rows double as the customer population: one customer per row.
//! Each customer after the first draws a uniform value, looks it up in the
//! cumulative column and uses the matching row index as its gap to the
//! previous arrival.

use rand::Rng;
use serde::Serialize;

use crate::core::state::Ticks;

/// Cumulative mass at which the table is considered complete.
pub const CUMULATIVE_CUTOFF: f64 = 0.99999;

/// Last row index, reached only for very large means.
pub const MAX_ROW: usize = 50;

fn round5(x: f64) -> f64 {
    (x * 1e5).round() / 1e5
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoissonTable {
    pub probabilities: Vec<f64>,
    pub cumulative: Vec<f64>,
}

impl PoissonTable {
    pub fn new(lambda: f64) -> Self {
        let mut probabilities = Vec::new();
        let mut cumulative = Vec::new();
        let mut p = (-lambda).exp();
        let mut total = 0.0;

        for i in 0..=MAX_ROW {
            if i > 0 {
                p *= lambda / i as f64;
            }
            total += p;
            probabilities.push(round5(p));

            let rounded = round5(total);
            if rounded >= CUMULATIVE_CUTOFF {
                cumulative.push(1.0);
                break;
            }
            cumulative.push(rounded);
        }

        Self {
            probabilities,
            cumulative,
        }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// First row whose cumulative value exceeds `r`, else the last row.
    pub fn lookup(&self, r: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&c| r < c)
            .unwrap_or(self.len() - 1)
    }

    /// Lower edge of the lookup interval for `row`.
    pub fn lookup_floor(&self, row: usize) -> f64 {
        if row == 0 {
            0.0
        } else {
            self.cumulative[row - 1]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalDraw {
    pub cumulative_probability: f64,
    pub lookup_probability: f64,
    pub inter_arrival: Ticks,
    pub arrival_time: Ticks,
}

/// One draw per table row; the first customer arrives at 0.
pub fn generate_arrivals<R: Rng + ?Sized>(table: &PoissonTable, rng: &mut R) -> Vec<ArrivalDraw> {
    let mut draws = Vec::with_capacity(table.len());
    let mut arrival_time = 0;

    for row in 0..table.len() {
        let inter_arrival = if row == 0 {
            0
        } else {
            table.lookup(rng.random::<f64>()) as Ticks
        };
        arrival_time += inter_arrival;

        draws.push(ArrivalDraw {
            cumulative_probability: table.cumulative[row],
            lookup_probability: table.lookup_floor(row),
            inter_arrival,
            arrival_time,
        });
    }

    draws
}
