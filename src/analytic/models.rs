//! The six closed-form solvers. Inputs are per-minute rates and minute-based
//! means and variances.

use super::{Metrics, Model};
use crate::error::QueueError;

fn check_stable(model: Model, rho: f64) -> Result<(), QueueError> {
    if rho >= 1.0 || !rho.is_finite() {
        return Err(QueueError::unstable(model, rho));
    }
    Ok(())
}

// ln(e^x + e^y) without leaving log space
fn ln_add(x: f64, y: f64) -> f64 {
    let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// `P0` and `Lq` of an M/M/s queue with offered load `a = λ/μ`.
///
/// Erlang B comes from its recurrence and the `aⁿ/n!` terms are summed in
/// log space, so neither value overflows for large `s`. `P0` may underflow
/// to zero, which is its correct limit.
fn erlang_queue(a: f64, rho: f64, s: u32) -> (f64, f64) {
    let mut blocking = 1.0;
    let mut ln_term = 0.0;
    let mut ln_partial = f64::NEG_INFINITY;
    for n in 1..=s {
        let n = f64::from(n);
        ln_partial = ln_add(ln_partial, ln_term);
        ln_term += a.ln() - n.ln();
        blocking = a * blocking / (n + a * blocking);
    }

    let ln_norm = ln_add(ln_partial, ln_term - (1.0 - rho).ln());
    let p0 = (-ln_norm).exp();
    let wait_probability = blocking / (1.0 - rho * (1.0 - blocking));
    let lq = wait_probability * rho / (1.0 - rho);
    (p0, lq)
}

pub fn mm1(lambda: f64, mu: f64) -> Result<Metrics, QueueError> {
    let rho = lambda / mu;
    check_stable(Model::MM1, rho)?;

    let lq = rho * rho / (1.0 - rho);
    let wq = lq / lambda;
    let w = wq + 1.0 / mu;
    Ok(Metrics {
        model: Model::MM1,
        rho,
        p0: 1.0 - rho,
        l: lambda * w,
        lq,
        w,
        wq,
        ca2: 1.0,
        cs2: 1.0,
    })
}

pub fn mms(lambda: f64, mu: f64, s: u32) -> Result<Metrics, QueueError> {
    let rho = lambda / (f64::from(s) * mu);
    check_stable(Model::MMs, rho)?;

    let (p0, lq) = erlang_queue(lambda / mu, rho, s);
    let wq = lq / lambda;
    let w = wq + 1.0 / mu;
    Ok(Metrics {
        model: Model::MMs,
        rho,
        p0,
        l: lambda * w,
        lq,
        w,
        wq,
        ca2: 1.0,
        cs2: 1.0,
    })
}

/// Pollaczek-Khinchine.
pub fn mg1(lambda: f64, mean_service: f64, var_service: f64) -> Result<Metrics, QueueError> {
    let mu = 1.0 / mean_service;
    let rho = lambda / mu;
    check_stable(Model::MG1, rho)?;

    let lq = (lambda * lambda * var_service + rho * rho) / (2.0 * (1.0 - rho));
    let wq = lq / lambda;
    let w = wq + mean_service;
    Ok(Metrics {
        model: Model::MG1,
        rho,
        p0: 1.0 - rho,
        l: lambda * w,
        lq,
        w,
        wq,
        ca2: 1.0,
        cs2: var_service * mu * mu,
    })
}

/// M/M/s waiting time scaled by `(1 + Cs²) / 2`.
pub fn mgs(
    lambda: f64,
    mean_service: f64,
    var_service: f64,
    s: u32,
) -> Result<Metrics, QueueError> {
    let mu = 1.0 / mean_service;
    let rho = lambda / (f64::from(s) * mu);
    check_stable(Model::MGs, rho)?;

    let (p0, base_lq) = erlang_queue(lambda / mu, rho, s);
    let cs2 = var_service * mu * mu;
    let wq = base_lq / lambda * (1.0 + cs2) / 2.0;
    let w = wq + mean_service;
    Ok(Metrics {
        model: Model::MGs,
        rho,
        p0,
        l: lambda * w,
        lq: lambda * wq,
        w,
        wq,
        ca2: 1.0,
        cs2,
    })
}

/// Two-moment approximation.
pub fn gg1(
    lambda: f64,
    var_arrival: f64,
    mean_service: f64,
    var_service: f64,
) -> Result<Metrics, QueueError> {
    let mu = 1.0 / mean_service;
    let rho = lambda / mu;
    check_stable(Model::GG1, rho)?;

    let ca2 = var_arrival * lambda * lambda;
    let cs2 = var_service * mu * mu;
    let rho2 = rho * rho;
    let lq = rho2 * (1.0 + cs2) * (ca2 + rho2 * cs2) / (2.0 * (1.0 - rho) * (1.0 + rho2 * cs2));
    let wq = lq / lambda;
    let w = wq + mean_service;
    Ok(Metrics {
        model: Model::GG1,
        rho,
        p0: 1.0 - rho,
        l: lambda * w,
        lq,
        w,
        wq,
        ca2,
        cs2,
    })
}

/// M/M/s waiting time scaled by `(Ca² + Cs²) / 2`.
pub fn ggs(
    lambda: f64,
    var_arrival: f64,
    mean_service: f64,
    var_service: f64,
    s: u32,
) -> Result<Metrics, QueueError> {
    let mu = 1.0 / mean_service;
    let rho = lambda / (f64::from(s) * mu);
    check_stable(Model::GGs, rho)?;

    let (p0, base_lq) = erlang_queue(lambda / mu, rho, s);
    let ca2 = var_arrival * lambda * lambda;
    let cs2 = var_service * mu * mu;
    let wq = base_lq / lambda * (ca2 + cs2) / 2.0;
    let w = wq + mean_service;
    Ok(Metrics {
        model: Model::GGs,
        rho,
        p0,
        l: lambda * w,
        lq: lambda * wq,
        w,
        wq,
        ca2,
        cs2,
    })
}
