//! Drift-only view of the model with boundary and non-decision time held fixed.

use serde::{Deserialize, Serialize};

use crate::forward::forward;
use crate::inverse::clamp_accuracy;
use crate::params::SummaryStats;
use crate::EzError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedDecisionModel {
    boundary: f64,
    nondecision: f64,
}

impl FixedDecisionModel {
    pub fn new(boundary: f64, nondecision: f64) -> Result<Self, EzError> {
        if !(boundary.is_finite() && boundary > 0.0) {
            return Err(EzError::InvalidParameter(format!(
                "boundary must be finite and > 0, got {boundary}"
            )));
        }
        if !(nondecision.is_finite() && nondecision >= 0.0) {
            return Err(EzError::InvalidParameter(format!(
                "nondecision must be finite and >= 0, got {nondecision}"
            )));
        }
        Ok(Self {
            boundary,
            nondecision,
        })
    }

    pub fn boundary(&self) -> f64 {
        self.boundary
    }

    pub fn nondecision(&self) -> f64 {
        self.nondecision
    }

    pub fn predict(&self, drift: f64) -> Result<SummaryStats, EzError> {
        forward(drift, self.boundary, self.nondecision)
    }

    /// Drift implied by an observed accuracy: `logit(R) = v a`.
    pub fn recover_drift(&self, accuracy: f64) -> Result<f64, EzError> {
        if !accuracy.is_finite() {
            return Err(EzError::DegenerateObservation(format!(
                "accuracy must be finite, got {accuracy}"
            )));
        }
        let r = clamp_accuracy(accuracy);
        let logit = (r / (1.0 - r)).ln();
        if logit == 0.0 {
            return Err(EzError::NumericDegeneracy(
                "accuracy of exactly 0.5 implies zero drift".to_string(),
            ));
        }
        Ok(logit / self.boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn drift_round_trips_through_accuracy() {
        let model = FixedDecisionModel::new(1.4, 0.25).unwrap();
        for drift in [-1.8, -0.6, 0.5, 1.0, 2.0] {
            let stats = model.predict(drift).unwrap();
            let recovered = model.recover_drift(stats.accuracy).unwrap();
            assert_abs_diff_eq!(recovered, drift, epsilon = 1e-9);
        }
    }

    #[test]
    fn predictions_use_fixed_parameters() {
        let model = FixedDecisionModel::new(1.0, 0.3).unwrap();
        assert_eq!(model.predict(1.0).unwrap(), forward(1.0, 1.0, 0.3).unwrap());
    }

    #[test]
    fn chance_accuracy_has_no_drift() {
        let model = FixedDecisionModel::new(1.0, 0.3).unwrap();
        assert!(matches!(
            model.recover_drift(0.5),
            Err(EzError::NumericDegeneracy(_))
        ));
    }

    #[test]
    fn invalid_fixed_parameters_are_rejected() {
        assert!(FixedDecisionModel::new(0.0, 0.3).is_err());
        assert!(FixedDecisionModel::new(1.0, -0.1).is_err());
    }
}
