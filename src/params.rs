//! Parameter and statistic value types
//!
//! The latent side of the model is a [`DiffusionParams`] triple (drift rate,
//! boundary separation, non-decision time); the observable side is a
//! [`SummaryStats`] triple (accuracy, mean RT, RT variance).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::forward::forward;
use crate::EzError;

/// Latent EZ-diffusion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionParams {
    /// Drift rate (nu); sign selects the dominant response
    pub drift: f64,
    /// Boundary separation (a)
    pub boundary: f64,
    /// Non-decision time (Ter)
    pub nondecision: f64,
}

impl DiffusionParams {
    pub fn new(drift: f64, boundary: f64, nondecision: f64) -> Self {
        Self {
            drift,
            boundary,
            nondecision,
        }
    }

    pub fn as_triple(&self) -> ParamTriple {
        ParamTriple::new(self.drift, self.boundary, self.nondecision)
    }
}

/// Observed or predicted summary statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Proportion of responses at the upper ("correct") boundary
    pub accuracy: f64,
    /// Mean response time, decision time plus non-decision time
    pub mean_rt: f64,
    /// Decision-time variance
    pub variance_rt: f64,
}

impl SummaryStats {
    pub fn new(accuracy: f64, mean_rt: f64, variance_rt: f64) -> Self {
        Self {
            accuracy,
            mean_rt,
            variance_rt,
        }
    }
}

/// Per-parameter quantity such as a bias or a squared error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamTriple {
    pub drift: f64,
    pub boundary: f64,
    pub nondecision: f64,
}

impl ParamTriple {
    pub fn new(drift: f64, boundary: f64, nondecision: f64) -> Self {
        Self {
            drift,
            boundary,
            nondecision,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Componentwise `self - other`.
    pub fn minus(&self, other: &ParamTriple) -> ParamTriple {
        ParamTriple::new(
            self.drift - other.drift,
            self.boundary - other.boundary,
            self.nondecision - other.nondecision,
        )
    }

    pub fn plus(&self, other: &ParamTriple) -> ParamTriple {
        ParamTriple::new(
            self.drift + other.drift,
            self.boundary + other.boundary,
            self.nondecision + other.nondecision,
        )
    }

    pub fn squared(&self) -> ParamTriple {
        ParamTriple::new(
            self.drift * self.drift,
            self.boundary * self.boundary,
            self.nondecision * self.nondecision,
        )
    }

    pub fn scaled(&self, factor: f64) -> ParamTriple {
        ParamTriple::new(
            self.drift * factor,
            self.boundary * factor,
            self.nondecision * factor,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.drift.is_finite() && self.boundary.is_finite() && self.nondecision.is_finite()
    }
}

/// Closed interval `[low, high]` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.low == self.high {
            return self.low;
        }
        rng.gen_range(self.low..=self.high)
    }

    fn validate(&self, name: &str) -> Result<(), EzError> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(EzError::InvalidConfig(format!(
                "{name} range must be finite"
            )));
        }
        if self.high < self.low {
            return Err(EzError::InvalidConfig(format!(
                "{name} range upper bound {} is below lower bound {}",
                self.high, self.low
            )));
        }
        Ok(())
    }
}

/// Ranges from which true parameters are drawn in a recovery trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRanges {
    pub drift: UniformRange,
    pub boundary: UniformRange,
    pub nondecision: UniformRange,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            drift: UniformRange::new(0.5, 2.0),
            boundary: UniformRange::new(0.5, 2.0),
            nondecision: UniformRange::new(0.1, 0.5),
        }
    }
}

impl ParameterRanges {
    pub fn validate(&self) -> Result<(), EzError> {
        self.drift.validate("drift")?;
        self.boundary.validate("boundary")?;
        self.nondecision.validate("nondecision")?;

        if self.drift.contains(0.0) {
            return Err(EzError::InvalidConfig(
                "drift range must not contain zero".to_string(),
            ));
        }
        if self.boundary.low <= 0.0 {
            return Err(EzError::InvalidConfig(
                "boundary range must be strictly positive".to_string(),
            ));
        }
        if self.nondecision.low < 0.0 {
            return Err(EzError::InvalidConfig(
                "nondecision range must be non-negative".to_string(),
            ));
        }

        // |v| a is extremal at the corners, so every draw inside has valid statistics.
        for drift in [self.drift.low, self.drift.high] {
            for boundary in [self.boundary.low, self.boundary.high] {
                forward(drift, boundary, self.nondecision.low).map_err(|err| {
                    EzError::InvalidConfig(format!(
                        "parameter ranges reach drift={drift}, boundary={boundary}: {err}"
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Draws one set of true parameters.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiffusionParams {
        DiffusionParams::new(
            self.drift.sample(rng),
            self.boundary.sample(rng),
            self.nondecision.sample(rng),
        )
    }
}
