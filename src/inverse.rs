//! Inverse EZ-diffusion equations
//!
//! Recovers (drift, boundary, nondecision) from observed accuracy, mean RT and
//! RT variance:
//!
//! ```text
//! L  = ln(R / (1 - R))
//! x  = L (L R^2 - L R + R - 1/2) / V
//! v  = sign(R - 1/2) x^(1/4)
//! a  = L / v
//! Ter = M - (a / 2v) (1 - exp(-v a)) / (1 + exp(-v a))
//! ```

use crate::forward::mean_decision_time;
use crate::params::{DiffusionParams, SummaryStats};
use crate::EzError;

/// Observed accuracy is clamped into `[margin, 1 - margin]` before the logit.
pub const ACCURACY_CLAMP_MARGIN: f64 = 1e-4;

/// Recovered parameters for the observed statistics.
pub fn recover(accuracy: f64, mean_rt: f64, variance_rt: f64) -> Result<DiffusionParams, EzError> {
    if !variance_rt.is_finite() || variance_rt <= 0.0 {
        return Err(EzError::DegenerateObservation(format!(
            "variance_rt must be finite and > 0, got {variance_rt}"
        )));
    }
    if !accuracy.is_finite() || !mean_rt.is_finite() {
        return Err(EzError::DegenerateObservation(format!(
            "accuracy={accuracy}, mean_rt={mean_rt} must be finite"
        )));
    }

    let r = clamp_accuracy(accuracy);
    let logit = (r / (1.0 - r)).ln();
    let drift = recover_drift(r, logit, variance_rt)?;
    let boundary = logit / drift;
    let nondecision = mean_rt - mean_decision_time(drift, boundary);

    Ok(DiffusionParams::new(drift, boundary, nondecision))
}

/// [`recover`] for a statistics struct.
pub fn recover_stats(stats: &SummaryStats) -> Result<DiffusionParams, EzError> {
    recover(stats.accuracy, stats.mean_rt, stats.variance_rt)
}

pub fn clamp_accuracy(accuracy: f64) -> f64 {
    accuracy.clamp(ACCURACY_CLAMP_MARGIN, 1.0 - ACCURACY_CLAMP_MARGIN)
}

fn recover_drift(r: f64, logit: f64, variance_rt: f64) -> Result<f64, EzError> {
    if logit == 0.0 {
        return Err(EzError::NumericDegeneracy(
            "accuracy of exactly 0.5 implies zero drift".to_string(),
        ));
    }

    let x = logit * (logit * r * r - logit * r + r - 0.5) / variance_rt;
    if !x.is_finite() || x <= 0.0 {
        return Err(EzError::NumericDegeneracy(format!(
            "drift kernel {x} is not positive (accuracy={r}, variance_rt={variance_rt})"
        )));
    }

    Ok((r - 0.5).signum() * x.powf(0.25))
}
