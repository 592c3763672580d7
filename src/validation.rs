//! Monte Carlo simulate-and-recover loop
//!
//! Every sample size gets its own ChaCha8 stream (`set_stream(n)` on the run
//! seed), so a size's results do not depend on which other sizes are run
//! alongside it or in what order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ObservationModel, ValidationConfig};
use crate::params::{ParamTriple, ParameterRanges};
use crate::trial::{RecoveryTrial, TrialOutcome, TrialRecord};
use crate::EzError;

/// Success rate below which a sample size is reported at `warn` level.
const LOW_SUCCESS_RATE: f64 = 0.5;

/// Aggregate recovery quality for one sample size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeSummary {
    pub sample_size: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub success_rate: f64,
    /// Mean of `true - estimate` over successful trials
    pub mean_bias: Option<ParamTriple>,
    pub mean_squared_error: Option<ParamTriple>,
}

impl SampleSizeSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn root_mean_squared_error(&self) -> Option<ParamTriple> {
        self.mean_squared_error.map(|mse| {
            ParamTriple::new(
                mse.drift.sqrt(),
                mse.boundary.sqrt(),
                mse.nondecision.sqrt(),
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Seed actually used, including one drawn from entropy
    pub seed: u64,
    pub iterations: usize,
    pub ranges: ParameterRanges,
    pub observation: ObservationModel,
    pub summaries: Vec<SampleSizeSummary>,
    /// Per-trial records, only filled when `keep_records` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<TrialRecord>,
}

impl ValidationReport {
    pub fn summary_for(&self, sample_size: usize) -> Option<&SampleSizeSummary> {
        self.summaries
            .iter()
            .find(|summary| summary.sample_size == sample_size)
    }
}

#[derive(Debug, Default, Clone)]
struct RecoveryAccumulator {
    attempted: usize,
    succeeded: usize,
    bias_sum: ParamTriple,
    squared_error_sum: ParamTriple,
}

impl RecoveryAccumulator {
    fn observe(&mut self, record: &TrialRecord) {
        self.attempted += 1;
        if let TrialOutcome::Recovered {
            bias,
            squared_error,
            ..
        } = &record.outcome
        {
            self.succeeded += 1;
            self.bias_sum = self.bias_sum.plus(bias);
            self.squared_error_sum = self.squared_error_sum.plus(squared_error);
        }
    }

    fn finalize(&self, sample_size: usize) -> SampleSizeSummary {
        let success_rate = if self.attempted > 0 {
            self.succeeded as f64 / self.attempted as f64
        } else {
            0.0
        };

        let (mean_bias, mean_squared_error) = if self.succeeded > 0 {
            let inv = 1.0 / self.succeeded as f64;
            (
                Some(self.bias_sum.scaled(inv)),
                Some(self.squared_error_sum.scaled(inv)),
            )
        } else {
            (None, None)
        };

        SampleSizeSummary {
            sample_size,
            attempted: self.attempted,
            succeeded: self.succeeded,
            success_rate,
            mean_bias,
            mean_squared_error,
        }
    }
}

/// Random stream dedicated to one sample size of a run.
pub fn sample_size_rng(seed: u64, sample_size: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(sample_size as u64);
    rng
}

/// Runs `config.iterations` recovery trials at one sample size.
pub fn run_sample_size(
    config: &ValidationConfig,
    sample_size: usize,
    seed: u64,
) -> Result<Vec<TrialRecord>, EzError> {
    let trial = RecoveryTrial::new(sample_size, config.ranges, config.observation)?;
    let mut rng = sample_size_rng(seed, sample_size);
    let mut records = Vec::with_capacity(config.iterations);

    for trial_id in 0..config.iterations {
        let record = trial.run(trial_id, &mut rng)?;
        if let Some(reason) = record.failure() {
            tracing::debug!(
                sample_size,
                trial_id,
                reason = reason.label(),
                detail = reason.detail(),
                "recovery failed"
            );
        }
        records.push(record);
    }

    Ok(records)
}

/// Mean bias, mean squared error and success rate over a set of records.
pub fn summarize_records(sample_size: usize, records: &[TrialRecord]) -> SampleSizeSummary {
    let mut acc = RecoveryAccumulator::default();
    for record in records {
        acc.observe(record);
    }
    acc.finalize(sample_size)
}

pub fn run_validation_with_config(config: &ValidationConfig) -> Result<ValidationReport, EzError> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut summaries = Vec::with_capacity(config.sample_sizes.len());
    let mut kept = Vec::new();

    for &sample_size in &config.sample_sizes {
        let records = run_sample_size(config, sample_size, seed)?;
        let summary = summarize_records(sample_size, &records);

        tracing::info!(
            sample_size,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            success_rate = summary.success_rate,
            "sample size complete"
        );
        if summary.success_rate < LOW_SUCCESS_RATE {
            tracing::warn!(
                sample_size,
                success_rate = summary.success_rate,
                "most recoveries failed at this sample size"
            );
        }

        if config.keep_records {
            kept.extend(records);
        }
        summaries.push(summary);
    }

    Ok(ValidationReport {
        seed,
        iterations: config.iterations,
        ranges: config.ranges,
        observation: config.observation,
        summaries,
        records: kept,
    })
}

/// Closed-form simulate-and-recover over the default parameter ranges.
pub fn run_validation(
    sample_sizes: &[usize],
    iterations: usize,
    seed: Option<u64>,
) -> Result<ValidationReport, EzError> {
    let config = ValidationConfig {
        sample_sizes: sample_sizes.to_vec(),
        iterations,
        seed,
        ..ValidationConfig::default()
    };
    run_validation_with_config(&config)
}
