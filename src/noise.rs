//! Finite-sample noise for predicted summary statistics
//!
//! Turns the model's predicted statistics into what an experiment with `n`
//! trials would observe: accuracy is a binomial proportion, the mean RT is
//! normal around the prediction, and the sample variance follows the scaled
//! chi-square law expressed as a gamma distribution.

use rand::Rng;
use rand_distr::{Binomial, Distribution, Gamma, Normal};

use crate::params::SummaryStats;
use crate::EzError;

/// Sampler for observed statistics at a fixed sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSampler {
    n: usize,
}

impl NoiseSampler {
    /// The variance draw needs `n - 1 > 0` degrees of freedom, so `n < 2` is
    /// rejected rather than skipping the variance noise.
    pub fn new(n: usize) -> Result<Self, EzError> {
        if n < 2 {
            return Err(EzError::InvalidSampleSize {
                n,
                reason: "at least two trials are needed to sample an RT variance",
            });
        }
        Ok(Self { n })
    }

    pub fn sample_size(&self) -> usize {
        self.n
    }

    /// Observed accuracy `k / n` with `k ~ Binomial(n, r_pred)`.
    pub fn accuracy<R: Rng + ?Sized>(&self, rng: &mut R, r_pred: f64) -> Result<f64, EzError> {
        let dist = Binomial::new(self.n as u64, r_pred)
            .map_err(|err| EzError::Distribution(format!("binomial(p={r_pred}): {err}")))?;
        Ok(dist.sample(rng) as f64 / self.n as f64)
    }

    /// Observed mean RT from `Normal(m_pred, v_pred / n)`.
    pub fn mean_rt<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        m_pred: f64,
        v_pred: f64,
    ) -> Result<f64, EzError> {
        let std_dev = (v_pred / self.n as f64).sqrt();
        let dist = Normal::new(m_pred, std_dev).map_err(|err| {
            EzError::Distribution(format!("normal(mean={m_pred}, sd={std_dev}): {err}"))
        })?;
        Ok(dist.sample(rng))
    }

    /// Observed RT variance from `Gamma((n - 1) / 2, 2 v_pred / (n - 1))`.
    pub fn variance_rt<R: Rng + ?Sized>(&self, rng: &mut R, v_pred: f64) -> Result<f64, EzError> {
        let dof = (self.n - 1) as f64;
        let shape = dof / 2.0;
        let scale = 2.0 * v_pred / dof;
        let dist = Gamma::new(shape, scale).map_err(|err| {
            EzError::Distribution(format!("gamma(shape={shape}, scale={scale}): {err}"))
        })?;
        Ok(dist.sample(rng))
    }

    /// Draws all three observed statistics for one simulated experiment.
    pub fn observe<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        predicted: &SummaryStats,
    ) -> Result<SummaryStats, EzError> {
        let accuracy = self.accuracy(rng, predicted.accuracy)?;
        let mean_rt = self.mean_rt(rng, predicted.mean_rt, predicted.variance_rt)?;
        let variance_rt = self.variance_rt(rng, predicted.variance_rt)?;
        Ok(SummaryStats::new(accuracy, mean_rt, variance_rt))
    }
}
