//! One simulate-and-recover cycle
//!
//! Draw true parameters, predict their statistics, add finite-sample noise,
//! invert, and score the estimate against the truth.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ObservationModel;
use crate::forward::forward_params;
use crate::inverse::recover_stats;
use crate::noise::NoiseSampler;
use crate::params::{DiffusionParams, ParamTriple, ParameterRanges, SummaryStats};
use crate::random_walk::simulate_summary;
use crate::EzError;

/// Why a trial produced no estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    DegenerateObservation(String),
    NumericDegeneracy(String),
    /// Too few simulated random-walk trials reached a boundary
    Censored(String),
}

impl FailureReason {
    /// Classifies a per-trial error; configuration and model errors are
    /// handed back.
    fn from_trial_error(err: EzError) -> Result<Self, EzError> {
        match err {
            EzError::DegenerateObservation(detail) => Ok(Self::DegenerateObservation(detail)),
            EzError::NumericDegeneracy(detail) => Ok(Self::NumericDegeneracy(detail)),
            censored @ EzError::Censored { .. } => Ok(Self::Censored(censored.to_string())),
            other => Err(other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DegenerateObservation(_) => "degenerate_observation",
            Self::NumericDegeneracy(_) => "numeric_degeneracy",
            Self::Censored(_) => "censored",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::DegenerateObservation(detail)
            | Self::NumericDegeneracy(detail)
            | Self::Censored(detail) => detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialOutcome {
    Recovered {
        estimate: DiffusionParams,
        /// `true - estimate`
        bias: ParamTriple,
        squared_error: ParamTriple,
    },
    Failed {
        reason: FailureReason,
    },
}

/// Result of one recovery trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_id: usize,
    pub sample_size: usize,
    pub truth: DiffusionParams,
    /// Absent when the simulation produced no statistics to invert
    pub observed: Option<SummaryStats>,
    pub outcome: TrialOutcome,
}

impl TrialRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TrialOutcome::Recovered { .. })
    }

    pub fn estimate(&self) -> Option<&DiffusionParams> {
        match &self.outcome {
            TrialOutcome::Recovered { estimate, .. } => Some(estimate),
            TrialOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            TrialOutcome::Recovered { .. } => None,
            TrialOutcome::Failed { reason } => Some(reason),
        }
    }
}

/// Recovery trial runner for one sample size.
#[derive(Debug, Clone)]
pub struct RecoveryTrial {
    sampler: NoiseSampler,
    ranges: ParameterRanges,
    observation: ObservationModel,
}

impl RecoveryTrial {
    pub fn new(
        sample_size: usize,
        ranges: ParameterRanges,
        observation: ObservationModel,
    ) -> Result<Self, EzError> {
        ranges.validate()?;
        if let ObservationModel::RandomWalk(walk) = &observation {
            walk.validate()?;
        }
        Ok(Self {
            sampler: NoiseSampler::new(sample_size)?,
            ranges,
            observation,
        })
    }

    pub fn sample_size(&self) -> usize {
        self.sampler.sample_size()
    }

    /// Runs a trial with true parameters drawn from the configured ranges.
    pub fn run<R: Rng + ?Sized>(
        &self,
        trial_id: usize,
        rng: &mut R,
    ) -> Result<TrialRecord, EzError> {
        let truth = self.ranges.sample(rng);
        self.run_with_truth(trial_id, truth, rng)
    }

    /// Runs a trial for known true parameters.
    ///
    /// Inverse-model failures and censored random-walk summaries become a
    /// failed record; errors in the forward model or the samplers are
    /// returned.
    pub fn run_with_truth<R: Rng + ?Sized>(
        &self,
        trial_id: usize,
        truth: DiffusionParams,
        rng: &mut R,
    ) -> Result<TrialRecord, EzError> {
        let (observed, outcome) = match self.observe(&truth, rng) {
            Ok(observed) => (Some(observed), score(&truth, &observed)?),
            Err(err) => {
                let reason = FailureReason::from_trial_error(err)?;
                (None, TrialOutcome::Failed { reason })
            }
        };

        Ok(TrialRecord {
            trial_id,
            sample_size: self.sample_size(),
            truth,
            observed,
            outcome,
        })
    }

    fn observe<R: Rng + ?Sized>(
        &self,
        truth: &DiffusionParams,
        rng: &mut R,
    ) -> Result<SummaryStats, EzError> {
        match &self.observation {
            ObservationModel::ClosedForm => {
                let predicted = forward_params(truth)?;
                self.sampler.observe(rng, &predicted)
            }
            ObservationModel::RandomWalk(walk) => {
                simulate_summary(truth, self.sample_size(), walk, rng)
            }
        }
    }
}

fn score(truth: &DiffusionParams, observed: &SummaryStats) -> Result<TrialOutcome, EzError> {
    match recover_stats(observed) {
        Ok(estimate) => {
            let bias = truth.as_triple().minus(&estimate.as_triple());
            Ok(TrialOutcome::Recovered {
                estimate,
                bias,
                squared_error: bias.squared(),
            })
        }
        Err(err) => Ok(TrialOutcome::Failed {
            reason: FailureReason::from_trial_error(err)?,
        }),
    }
}
