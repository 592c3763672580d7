use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ez_diffusion::io::{
    create_run_output_dir, write_report_json, write_summary_csv, write_trials_csv,
};
use ez_diffusion::{
    run_validation_with_config, ObservationModel, RandomWalkConfig, ValidationConfig,
};

#[derive(Debug, Parser)]
#[command(name = "simulate_recover")]
#[command(about = "EZ-diffusion simulate-and-recover across sample sizes")]
struct Cli {
    /// TOML or JSON run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output base directory; each run gets a timestamped subdirectory
    #[arg(long, default_value = "output-ez-diffusion")]
    outdir: PathBuf,

    /// Comma-separated sample sizes, e.g. 10,40,4000
    #[arg(long, value_delimiter = ',')]
    sample_sizes: Option<Vec<usize>>,

    /// Recovery trials per sample size
    #[arg(long)]
    iterations: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Generate observations with the trial-level random-walk simulator
    #[arg(long, default_value_t = false)]
    random_walk: bool,

    /// Also write one CSV row per trial
    #[arg(long, default_value_t = false)]
    trials: bool,
}

fn resolve_config(cli: &Cli) -> Result<ValidationConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ValidationConfig::from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => ValidationConfig::default(),
    };

    if let Some(sizes) = &cli.sample_sizes {
        cfg.sample_sizes = sizes.clone();
    }
    if let Some(v) = cli.iterations {
        cfg.iterations = v;
    }
    if let Some(v) = cli.seed {
        cfg.seed = Some(v);
    }
    if cli.random_walk && matches!(cfg.observation, ObservationModel::ClosedForm) {
        cfg.observation = ObservationModel::RandomWalk(RandomWalkConfig::default());
    }
    if cli.trials {
        cfg.keep_records = true;
    }

    cfg.validate().context("invalid run configuration")?;
    Ok(cfg)
}

fn fmt_cell(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{x:>10.5}"),
        None => format!("{:>10}", "NA"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;

    let report = run_validation_with_config(&cfg).context("simulate-and-recover run failed")?;

    let run_dir = create_run_output_dir(&cli.outdir).with_context(|| {
        format!(
            "failed to create run directory under {}",
            cli.outdir.display()
        )
    })?;
    let summary_path = run_dir.join("summary.csv");
    write_summary_csv(&summary_path, &report.summaries)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;
    let report_path = write_report_json(&run_dir, &report).context("failed to write report")?;
    if cfg.keep_records {
        let trials_path = run_dir.join("trials.csv");
        write_trials_csv(&trials_path, &report.records)
            .with_context(|| format!("failed to write {}", trials_path.display()))?;
        println!("Trials: {}", trials_path.display());
    }

    println!(
        "Seed: {} | iterations per sample size: {}",
        report.seed, report.iterations
    );
    println!(
        "{:>8} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "N", "success", "bias_v", "bias_a", "bias_t", "mse_v", "mse_a", "mse_t"
    );
    for s in &report.summaries {
        println!(
            "{:>8} {:>8.3} {} {} {} {} {} {}",
            s.sample_size,
            s.success_rate,
            fmt_cell(s.mean_bias.map(|b| b.drift)),
            fmt_cell(s.mean_bias.map(|b| b.boundary)),
            fmt_cell(s.mean_bias.map(|b| b.nondecision)),
            fmt_cell(s.mean_squared_error.map(|m| m.drift)),
            fmt_cell(s.mean_squared_error.map(|m| m.boundary)),
            fmt_cell(s.mean_squared_error.map(|m| m.nondecision)),
        );
    }

    println!("Run directory: {}", run_dir.display());
    println!("Summary: {}", summary_path.display());
    println!("Report: {}", report_path.display());
    Ok(())
}
