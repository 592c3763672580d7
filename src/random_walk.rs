//! Trial-level random-walk simulator
//!
//! Euler-Maruyama integration of the Wiener diffusion process
//!
//! ```text
//! x_{k+1} = x_k + v dt + s sqrt(dt) Z_k,   Z_k ~ N(0, 1)
//! ```
//!
//! started at `start_point * a` and stopped at the first crossing of `0`
//! (error) or `a` (correct). Summaries of simulated trials are an alternative
//! to [`crate::noise::NoiseSampler`] for producing observed statistics.
//! Discrete stepping overshoots the boundaries, so the simulated statistics
//! approach the closed-form predictions only as `dt -> 0`.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::params::{DiffusionParams, SummaryStats};
use crate::EzError;

/// Upper bound on `max_time / dt`, the step budget of a single trial.
pub const MAX_STEPS_PER_TRIAL: f64 = 1e8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkConfig {
    /// Integration step [s]
    pub dt: f64,
    /// Diffusion coefficient s
    pub noise_scale: f64,
    /// Starting point as a fraction of the boundary separation
    pub start_point: f64,
    /// Decision time after which a trial is abandoned [s]
    pub max_time: f64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            noise_scale: 1.0,
            start_point: 0.5,
            max_time: 20.0,
        }
    }
}

impl RandomWalkConfig {
    pub fn validate(&self) -> Result<(), EzError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(EzError::InvalidConfig("dt must be > 0".to_string()));
        }
        if !(self.noise_scale.is_finite() && self.noise_scale > 0.0) {
            return Err(EzError::InvalidConfig(
                "noise_scale must be > 0".to_string(),
            ));
        }
        if !(self.start_point > 0.0 && self.start_point < 1.0) {
            return Err(EzError::InvalidConfig(
                "start_point must be in (0, 1)".to_string(),
            ));
        }
        if !(self.max_time.is_finite() && self.max_time > self.dt) {
            return Err(EzError::InvalidConfig(
                "max_time must be finite and > dt".to_string(),
            ));
        }
        if self.max_time / self.dt > MAX_STEPS_PER_TRIAL {
            return Err(EzError::InvalidConfig(format!(
                "max_time / dt = {} exceeds the step budget of {MAX_STEPS_PER_TRIAL}",
                self.max_time / self.dt
            )));
        }
        Ok(())
    }

    fn max_steps(&self) -> usize {
        (self.max_time / self.dt).ceil() as usize
    }
}

/// Outcome of one simulated decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedResponse {
    /// Upper boundary reached
    pub correct: bool,
    /// Response time including non-decision time
    pub rt: f64,
}

/// Simulates a single trial; `None` if no boundary is reached within `max_time`.
pub fn simulate_trial<R: Rng + ?Sized>(
    params: &DiffusionParams,
    config: &RandomWalkConfig,
    rng: &mut R,
) -> Option<SimulatedResponse> {
    let drift_step = params.drift * config.dt;
    let noise_step = config.noise_scale * config.dt.sqrt();
    let mut x = config.start_point * params.boundary;

    for step in 1..=config.max_steps() {
        let z: f64 = StandardNormal.sample(rng);
        x += drift_step + noise_step * z;

        if x >= params.boundary || x <= 0.0 {
            return Some(SimulatedResponse {
                correct: x >= params.boundary,
                rt: params.nondecision + step as f64 * config.dt,
            });
        }
    }

    None
}

/// Simulates `n` trials and summarises the terminated ones.
///
/// Accuracy is the share of upper-boundary responses, the variance is the
/// unbiased sample variance of the RTs. Fewer than two terminated trials give
/// [`EzError::Censored`].
pub fn simulate_summary<R: Rng + ?Sized>(
    params: &DiffusionParams,
    n: usize,
    config: &RandomWalkConfig,
    rng: &mut R,
) -> Result<SummaryStats, EzError> {
    config.validate()?;
    if !(params.boundary.is_finite() && params.boundary > 0.0) {
        return Err(EzError::InvalidParameter(format!(
            "boundary must be finite and > 0, got {}",
            params.boundary
        )));
    }
    if !params.drift.is_finite() || !params.nondecision.is_finite() {
        return Err(EzError::InvalidParameter(
            "drift and nondecision must be finite".to_string(),
        ));
    }

    let responses: Vec<SimulatedResponse> = (0..n)
        .filter_map(|_| simulate_trial(params, config, rng))
        .collect();

    if responses.len() < 2 {
        return Err(EzError::Censored {
            terminated: responses.len(),
            requested: n,
        });
    }
    if responses.len() < n {
        tracing::debug!(
            censored = n - responses.len(),
            max_time = config.max_time,
            "random-walk trials abandoned without a response"
        );
    }

    let count = responses.len() as f64;
    let correct = responses.iter().filter(|r| r.correct).count() as f64;
    let mean_rt = responses.iter().map(|r| r.rt).sum::<f64>() / count;
    let variance_rt = responses
        .iter()
        .map(|r| (r.rt - mean_rt).powi(2))
        .sum::<f64>()
        / (count - 1.0);

    Ok(SummaryStats::new(correct / count, mean_rt, variance_rt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::forward;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn summary_approaches_closed_form() {
        let params = DiffusionParams::new(1.0, 1.0, 0.3);
        let predicted = forward(1.0, 1.0, 0.3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        let observed =
            simulate_summary(&params, 4000, &RandomWalkConfig::default(), &mut rng).unwrap();

        assert!((observed.accuracy - predicted.accuracy).abs() < 0.03);
        assert!((observed.mean_rt - predicted.mean_rt).abs() < 0.05);
        assert!((observed.variance_rt - predicted.variance_rt).abs() < 0.015);
    }

    #[test]
    fn response_times_include_nondecision_time() {
        let params = DiffusionParams::new(1.5, 0.8, 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let response = simulate_trial(&params, &RandomWalkConfig::default(), &mut rng)
                .expect("trial should terminate");
            assert!(response.rt > 0.4);
        }
    }

    #[test]
    fn start_near_upper_boundary_favours_correct_responses() {
        let params = DiffusionParams::new(0.0, 1.0, 0.0);
        let config = RandomWalkConfig {
            start_point: 0.9,
            ..RandomWalkConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let stats = simulate_summary(&params, 1000, &config, &mut rng).unwrap();
        assert!(stats.accuracy > 0.8);
    }

    #[test]
    fn short_time_limit_abandons_trials() {
        let params = DiffusionParams::new(0.1, 2.0, 0.3);
        let config = RandomWalkConfig {
            dt: 1e-3,
            max_time: 2e-3,
            ..RandomWalkConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!(simulate_trial(&params, &config, &mut rng).is_none());
        assert!(matches!(
            simulate_summary(&params, 10, &config, &mut rng),
            Err(EzError::Censored {
                terminated: 0,
                requested: 10
            })
        ));
    }

    #[test]
    fn step_budget_is_enforced() {
        let config = RandomWalkConfig {
            dt: 1e-12,
            ..RandomWalkConfig::default()
        };
        assert!(matches!(config.validate(), Err(EzError::InvalidConfig(_))));

        let fine = RandomWalkConfig {
            dt: 1e-6,
            max_time: 50.0,
            ..RandomWalkConfig::default()
        };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RandomWalkConfig {
            start_point: 1.0,
            ..RandomWalkConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
