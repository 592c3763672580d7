use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::WriterBuilder;

use crate::params::ParamTriple;
use crate::trial::TrialRecord;
use crate::validation::{SampleSizeSummary, ValidationReport};
use crate::EzError;

pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

fn fmt_f64(v: f64) -> String {
    format!("{v:.10}")
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => fmt_f64(x),
        None => "NA".to_string(),
    }
}

fn triple_fields(triple: Option<&ParamTriple>) -> [String; 3] {
    [
        fmt_opt(triple.map(|t| t.drift)),
        fmt_opt(triple.map(|t| t.boundary)),
        fmt_opt(triple.map(|t| t.nondecision)),
    ]
}

/// Creates `<base>/<UTC timestamp>`, suffixing the name if it already exists.
pub fn create_run_output_dir(base_dir: &Path) -> Result<PathBuf, EzError> {
    fs::create_dir_all(base_dir)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut run_dir = base_dir.join(&timestamp);
    let mut counter = 1_u32;

    while run_dir.exists() {
        run_dir = base_dir.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&run_dir)?;
    Ok(run_dir)
}

/// One row per sample size.
pub fn write_summary_csv(path: &Path, summaries: &[SampleSizeSummary]) -> Result<(), EzError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;

    wtr.write_record([
        "sample_size",
        "attempted",
        "succeeded",
        "success_rate",
        "bias_drift",
        "bias_boundary",
        "bias_nondecision",
        "mse_drift",
        "mse_boundary",
        "mse_nondecision",
        "schema_version",
    ])?;

    for summary in summaries {
        let [bias_v, bias_a, bias_t] = triple_fields(summary.mean_bias.as_ref());
        let [mse_v, mse_a, mse_t] = triple_fields(summary.mean_squared_error.as_ref());
        wtr.write_record([
            summary.sample_size.to_string().as_str(),
            &summary.attempted.to_string(),
            &summary.succeeded.to_string(),
            &fmt_f64(summary.success_rate),
            &bias_v,
            &bias_a,
            &bias_t,
            &mse_v,
            &mse_a,
            &mse_t,
            OUTPUT_SCHEMA_VERSION,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// One row per recovery trial; estimates of failed trials and statistics of
/// censored ones are `NA`.
pub fn write_trials_csv(path: &Path, records: &[TrialRecord]) -> Result<(), EzError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;

    wtr.write_record([
        "trial_id",
        "sample_size",
        "true_drift",
        "true_boundary",
        "true_nondecision",
        "obs_accuracy",
        "obs_mean_rt",
        "obs_variance_rt",
        "status",
        "est_drift",
        "est_boundary",
        "est_nondecision",
        "failure_reason",
    ])?;

    for record in records {
        let observed = record.observed.as_ref();
        let obs_r = fmt_opt(observed.map(|o| o.accuracy));
        let obs_m = fmt_opt(observed.map(|o| o.mean_rt));
        let obs_v = fmt_opt(observed.map(|o| o.variance_rt));
        let estimate = record.estimate().map(|e| e.as_triple());
        let [est_v, est_a, est_t] = triple_fields(estimate.as_ref());
        let (status, reason) = match record.failure() {
            Some(reason) => ("failed", reason.label()),
            None => ("recovered", ""),
        };

        wtr.write_record([
            record.trial_id.to_string().as_str(),
            &record.sample_size.to_string(),
            &fmt_f64(record.truth.drift),
            &fmt_f64(record.truth.boundary),
            &fmt_f64(record.truth.nondecision),
            &obs_r,
            &obs_m,
            &obs_v,
            status,
            &est_v,
            &est_a,
            &est_t,
            reason,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_report_json(outdir: &Path, report: &ValidationReport) -> Result<PathBuf, EzError> {
    let path = outdir.join("report.json");
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
