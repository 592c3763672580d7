use approx::assert_abs_diff_eq;
use ez_diffusion::{
    forward, recover, run_validation, run_validation_with_config, EzError, ObservationModel,
    ParameterRanges, RandomWalkConfig, UniformRange, ValidationConfig,
};

#[test]
fn concrete_scenario_round_trips() {
    let stats = forward(1.0, 1.0, 0.3).unwrap();
    assert_abs_diff_eq!(stats.accuracy, 0.7310585786, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.mean_rt, 0.3 + 0.5 * 0.5_f64.tanh(), epsilon = 1e-12);

    let est = recover(stats.accuracy, stats.mean_rt, stats.variance_rt).unwrap();
    assert_abs_diff_eq!(est.drift, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(est.boundary, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(est.nondecision, 0.3, epsilon = 1e-6);
}

#[test]
fn chance_accuracy_is_a_typed_failure() {
    let result = recover(0.5, 0.5, 0.1);
    assert!(matches!(result, Err(EzError::NumericDegeneracy(_))));
}

#[test]
fn mean_squared_error_shrinks_with_sample_size() {
    let report = run_validation(&[10, 40, 4000], 1000, Some(2025)).unwrap();

    let small = report.summary_for(10).unwrap();
    let large = report.summary_for(4000).unwrap();
    let small_mse = small.mean_squared_error.unwrap();
    let large_mse = large.mean_squared_error.unwrap();

    assert!(large_mse.drift * 10.0 <= small_mse.drift);
    assert!(large_mse.boundary * 10.0 <= small_mse.boundary);
    assert!(large_mse.nondecision * 10.0 <= small_mse.nondecision);

    let medium_mse = report.summary_for(40).unwrap().mean_squared_error.unwrap();
    assert!(large_mse.drift < medium_mse.drift);
}

#[test]
fn large_samples_are_nearly_unbiased() {
    let report = run_validation(&[4000], 1000, Some(99)).unwrap();
    let summary = report.summary_for(4000).unwrap();

    assert_eq!(summary.success_rate, 1.0);
    let bias = summary.mean_bias.unwrap();
    assert!(bias.drift.abs() < 0.02, "drift bias {}", bias.drift);
    assert!(bias.boundary.abs() < 0.02, "boundary bias {}", bias.boundary);
    assert!(bias.nondecision.abs() < 0.01, "nondecision bias {}", bias.nondecision);
}

#[test]
fn small_samples_report_failures_without_aborting() {
    let report = run_validation(&[2, 10], 400, Some(31)).unwrap();
    let tiny = report.summary_for(2).unwrap();

    assert_eq!(tiny.attempted, 400);
    assert!(tiny.succeeded < tiny.attempted);
    assert!(tiny.success_rate < 1.0);
    assert!(tiny.mean_bias.is_some());
}

#[test]
fn random_walk_observations_recover_reasonably() {
    let config = ValidationConfig {
        sample_sizes: vec![400],
        iterations: 20,
        seed: Some(77),
        observation: ObservationModel::RandomWalk(RandomWalkConfig::default()),
        ..ValidationConfig::default()
    };
    let report = run_validation_with_config(&config).unwrap();
    let summary = report.summary_for(400).unwrap();

    assert_eq!(summary.attempted, 20);
    let rmse = summary.root_mean_squared_error().unwrap();
    assert!(rmse.drift < 0.6, "drift rmse {}", rmse.drift);
    assert!(rmse.nondecision < 0.15, "nondecision rmse {}", rmse.nondecision);
}

#[test]
fn censored_random_walk_trials_do_not_abort_the_run() {
    let config = ValidationConfig {
        sample_sizes: vec![2, 40],
        iterations: 200,
        seed: Some(13),
        observation: ObservationModel::RandomWalk(RandomWalkConfig {
            max_time: 0.5,
            ..RandomWalkConfig::default()
        }),
        keep_records: true,
        ..ValidationConfig::default()
    };
    let report = run_validation_with_config(&config).unwrap();

    for summary in &report.summaries {
        assert_eq!(summary.attempted, 200);
    }
    assert_eq!(report.records.len(), 400);

    let censored: Vec<_> = report
        .records
        .iter()
        .filter(|record| record.failure().map(|reason| reason.label()) == Some("censored"))
        .collect();
    assert!(!censored.is_empty());
    assert!(censored.iter().all(|record| record.observed.is_none()));
    assert!(report.summary_for(2).unwrap().succeeded < 200);
}

#[test]
fn near_zero_drift_range_runs_to_completion() {
    let config = ValidationConfig {
        sample_sizes: vec![10, 400],
        iterations: 100,
        seed: Some(3),
        ranges: ParameterRanges {
            drift: UniformRange::new(1e-7, 1e-6),
            ..ParameterRanges::default()
        },
        ..ValidationConfig::default()
    };
    let report = run_validation_with_config(&config).unwrap();

    for summary in &report.summaries {
        assert_eq!(summary.attempted, 100);
    }
}
