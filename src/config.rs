use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::params::ParameterRanges;
use crate::random_walk::RandomWalkConfig;
use crate::EzError;

pub const DEFAULT_SAMPLE_SIZES: [usize; 3] = [10, 40, 4000];
pub const DEFAULT_ITERATIONS: usize = 1000;

/// How a recovery trial turns true parameters into observed statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObservationModel {
    /// Closed-form prediction plus binomial/normal/gamma sampling noise
    #[default]
    ClosedForm,
    /// Summary of `n` simulated random-walk trials
    RandomWalk(RandomWalkConfig),
}

/// Configuration of a simulate-and-recover run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of experimental trials behind each observed statistic
    pub sample_sizes: Vec<usize>,
    /// Recovery trials per sample size
    pub iterations: usize,
    /// Seed for reproducible runs; drawn from entropy when absent
    pub seed: Option<u64>,
    pub ranges: ParameterRanges,
    pub observation: ObservationModel,
    /// Keep per-trial records in the report
    pub keep_records: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sample_sizes: DEFAULT_SAMPLE_SIZES.to_vec(),
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            ranges: ParameterRanges::default(),
            observation: ObservationModel::default(),
            keep_records: false,
        }
    }
}

impl ValidationConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, EzError> {
        let raw = fs::read_to_string(path)?;
        let config: ValidationConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, EzError> {
        let raw = fs::read_to_string(path)?;
        let config: ValidationConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads TOML or JSON depending on the file extension.
    pub fn from_file(path: &Path) -> Result<Self, EzError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    pub fn validate(&self) -> Result<(), EzError> {
        if self.sample_sizes.is_empty() {
            return Err(EzError::InvalidConfig(
                "sample_sizes must not be empty".to_string(),
            ));
        }

        if let Some(&n) = self.sample_sizes.iter().find(|&&n| n < 2) {
            return Err(EzError::InvalidConfig(format!(
                "sample size {n} is too small; every sample size must be >= 2"
            )));
        }

        if self.iterations == 0 {
            return Err(EzError::InvalidConfig(
                "iterations must be greater than zero".to_string(),
            ));
        }

        self.ranges.validate()?;

        if let ObservationModel::RandomWalk(walk) = &self.observation {
            walk.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::UniformRange;

    #[test]
    fn default_config_is_valid() {
        let config = ValidationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_sizes, vec![10, 40, 4000]);
        assert_eq!(config.iterations, 1000);
    }

    #[test]
    fn sample_size_below_two_is_rejected() {
        let config = ValidationConfig {
            sample_sizes: vec![10, 1],
            ..ValidationConfig::default()
        };
        assert!(matches!(config.validate(), Err(EzError::InvalidConfig(_))));
    }

    #[test]
    fn empty_sample_sizes_are_rejected() {
        let config = ValidationConfig {
            sample_sizes: Vec::new(),
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let config = ValidationConfig {
            iterations: 0,
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let raw = r#"
            sample_sizes = [20, 200]
            seed = 9

            [ranges.nondecision]
            low = 0.2
            high = 0.3

            [observation]
            kind = "random_walk"
            dt = 0.0005
        "#;
        let config: ValidationConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.sample_sizes, vec![20, 200]);
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.ranges.nondecision, UniformRange::new(0.2, 0.3));
        assert_eq!(config.ranges.drift, UniformRange::new(0.5, 2.0));
        match config.observation {
            ObservationModel::RandomWalk(walk) => {
                assert_eq!(walk.dt, 0.0005);
                assert_eq!(walk.start_point, 0.5);
            }
            ObservationModel::ClosedForm => panic!("expected random-walk observation"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_file_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ValidationConfig {
            sample_sizes: vec![50],
            iterations: 12,
            seed: Some(3),
            ..ValidationConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = ValidationConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn shipped_configs_load() {
        let configs = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");

        let default = ValidationConfig::from_toml_file(&configs.join("default.toml")).unwrap();
        assert_eq!(
            default,
            ValidationConfig {
                seed: Some(2025),
                ..ValidationConfig::default()
            }
        );

        let walk = ValidationConfig::from_toml_file(&configs.join("random_walk.toml")).unwrap();
        assert_eq!(
            walk.observation,
            ObservationModel::RandomWalk(RandomWalkConfig::default())
        );
    }

    #[test]
    fn invalid_file_config_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "sample_sizes = [1]\n").unwrap();
        assert!(matches!(
            ValidationConfig::from_file(&path),
            Err(EzError::InvalidConfig(_))
        ));
    }
}
