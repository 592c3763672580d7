//! EZ-Diffusion
//!
//! Closed-form forward and inverse equations of the EZ-diffusion model
//! (Wagenmakers, van der Maas & Grasman, 2007) together with a
//! simulate-and-recover harness that measures how well the inverse equations
//! recover known drift rate, boundary separation and non-decision time from
//! finite-sample summary statistics.

pub mod config;
pub mod fixed;
pub mod forward;
pub mod inverse;
pub mod io;
pub mod noise;
pub mod params;
pub mod random_walk;
pub mod trial;
pub mod validation;

use thiserror::Error;

pub use config::{ObservationModel, ValidationConfig};
pub use fixed::FixedDecisionModel;
pub use forward::forward;
pub use inverse::{recover, ACCURACY_CLAMP_MARGIN};
pub use noise::NoiseSampler;
pub use params::{DiffusionParams, ParamTriple, ParameterRanges, SummaryStats, UniformRange};
pub use random_walk::RandomWalkConfig;
pub use trial::{FailureReason, RecoveryTrial, TrialOutcome, TrialRecord};
pub use validation::{
    run_validation, run_validation_with_config, SampleSizeSummary, ValidationReport,
};

#[derive(Debug, Error)]
pub enum EzError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("degenerate observation: {0}")]
    DegenerateObservation(String),
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),
    #[error("invalid sample size {n}: {reason}")]
    InvalidSampleSize { n: usize, reason: &'static str },
    #[error("only {terminated} of {requested} simulated trials reached a boundary")]
    Censored { terminated: usize, requested: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("distribution error: {0}")]
    Distribution(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
