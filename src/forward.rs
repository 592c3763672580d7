//! Forward EZ-diffusion equations
//!
//! Maps (drift, boundary, nondecision) to the predicted accuracy, mean RT and
//! RT variance of an unbiased Wiener process with diffusion scale s = 1:
//!
//! ```text
//! y = exp(-v a)
//! R = 1 / (1 + y)
//! M = Ter + (a / 2v) (1 - y) / (1 + y)
//! V = (a / 2v^3) (1 - 2 a v y - y^2) / (1 + y)^2
//! ```
//!
//! M and V are even in v and R(-v) = 1 - R(v), so everything is evaluated on
//! `u = |v| a` where `y <= 1`. For small `u` the variance numerator cancels to
//! `u^3 / 3`; there V is computed from the series of `(sinh u - u) / u^3`.

use crate::params::{DiffusionParams, SummaryStats};
use crate::EzError;

/// `|v| a` below which the variance comes from its power series.
const VARIANCE_SERIES_LIMIT: f64 = 1.0;

/// Predicted summary statistics for the given parameters.
///
/// Fails with [`EzError::InvalidParameter`] when `|v| a` is so large that the
/// accuracy rounds to 0 or 1, or when a statistic under- or overflows.
pub fn forward(drift: f64, boundary: f64, nondecision: f64) -> Result<SummaryStats, EzError> {
    check_params(drift, boundary, nondecision)?;

    if predicted_accuracy(drift.abs(), boundary) >= 1.0 {
        return Err(EzError::InvalidParameter(format!(
            "|drift| * boundary = {} saturates the predicted accuracy",
            drift.abs() * boundary
        )));
    }

    let stats = SummaryStats::new(
        predicted_accuracy(drift, boundary),
        nondecision + mean_decision_time(drift, boundary),
        decision_time_variance(drift, boundary),
    );

    let finite =
        stats.accuracy.is_finite() && stats.mean_rt.is_finite() && stats.variance_rt.is_finite();
    if !finite || stats.variance_rt <= 0.0 {
        return Err(EzError::InvalidParameter(format!(
            "drift={drift}, boundary={boundary} give no representable statistics \
             (mean_rt={}, variance_rt={})",
            stats.mean_rt, stats.variance_rt
        )));
    }

    Ok(stats)
}

/// [`forward`] for a parameter struct.
pub fn forward_params(params: &DiffusionParams) -> Result<SummaryStats, EzError> {
    forward(params.drift, params.boundary, params.nondecision)
}

pub fn predicted_accuracy(drift: f64, boundary: f64) -> f64 {
    let y = (-drift.abs() * boundary).exp();
    if drift >= 0.0 {
        1.0 / (1.0 + y)
    } else {
        y / (1.0 + y)
    }
}

/// Expected time to absorption, excluding non-decision time.
pub fn mean_decision_time(drift: f64, boundary: f64) -> f64 {
    let u = drift.abs() * boundary;
    (boundary / (2.0 * drift.abs())) * (0.5 * u).tanh()
}

pub fn decision_time_variance(drift: f64, boundary: f64) -> f64 {
    let u = drift.abs() * boundary;
    let a4 = boundary.powi(4);

    if u < VARIANCE_SERIES_LIMIT {
        // (a / 2|v|^3) (1 - 2uy - y^2) / (1 + y)^2 == a^4 (sinh u - u) / (4 u^3 cosh^2(u/2))
        a4 * sinh_excess_ratio(u) / (4.0 * (0.5 * u).cosh().powi(2))
    } else {
        let y = (-u).exp();
        let numerator = 1.0 - 2.0 * u * y - y * y;
        (a4 / (2.0 * u.powi(3))) * (numerator / (1.0 + y).powi(2))
    }
}

/// `(sinh u - u) / u^3 = sum_k u^(2k) / (2k + 3)!`, for `u < 1`.
fn sinh_excess_ratio(u: f64) -> f64 {
    let u2 = u * u;
    let mut term = 1.0 / 6.0;
    let mut sum = term;
    let mut n = 3.0;

    while term > sum * f64::EPSILON {
        term *= u2 / ((n + 1.0) * (n + 2.0));
        sum += term;
        n += 2.0;
    }

    sum
}

fn check_params(drift: f64, boundary: f64, nondecision: f64) -> Result<(), EzError> {
    if !drift.is_finite() || drift == 0.0 {
        return Err(EzError::InvalidParameter(format!(
            "drift must be finite and nonzero, got {drift}"
        )));
    }
    if !boundary.is_finite() || boundary <= 0.0 {
        return Err(EzError::InvalidParameter(format!(
            "boundary must be finite and > 0, got {boundary}"
        )));
    }
    if !nondecision.is_finite() || nondecision < 0.0 {
        return Err(EzError::InvalidParameter(format!(
            "nondecision must be finite and >= 0, got {nondecision}"
        )));
    }
    Ok(())
}
