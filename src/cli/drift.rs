//! Drift report CLI command.

use std::path::PathBuf;

use clap::Args;

use super::RunStatus;
use crate::{
    config::{DriftConfig, RiskThresholds},
    drift::DriftDetector,
    loader::load_table,
    report::DriftReport,
    simulate::{
        add_gaussian_noise, NoiseConfig, DEFAULT_BASELINE_SEED, DEFAULT_CURRENT_NOISE_STD,
        DEFAULT_CURRENT_SEED,
    },
    RiskLevel,
};

/// Arguments of `derivar report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Baseline dataset (csv, parquet, json, jsonl)
    #[arg(short, long)]
    pub baseline: PathBuf,
    /// Current dataset; simulated from the baseline when omitted
    #[arg(short, long)]
    pub current: Option<PathBuf>,
    /// Noise standard deviation for the simulated current dataset
    #[arg(long, default_value_t = DEFAULT_CURRENT_NOISE_STD)]
    pub noise_std: f64,
    /// Seed for the simulated current dataset
    #[arg(long, default_value_t = DEFAULT_CURRENT_SEED)]
    pub seed: u64,
    /// Noise standard deviation added to the baseline before comparing
    #[arg(long, default_value_t = 0.0)]
    pub baseline_noise_std: f64,
    /// Seed for baseline noise
    #[arg(long, default_value_t = DEFAULT_BASELINE_SEED)]
    pub baseline_seed: u64,
    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of PSI bins (overrides the config file)
    #[arg(long)]
    pub bins: Option<usize>,
    /// Number of JSD bins (overrides the config file)
    #[arg(long)]
    pub jsd_bins: Option<usize>,
    /// Columns to skip, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Threads used to score features (overrides the config file)
    #[arg(short, long)]
    pub workers: Option<usize>,
    /// Output file for the report (JSON format)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
    /// Exit with status 2 when the overall risk reaches this level
    #[arg(long)]
    pub fail_on: Option<RiskLevel>,
}

impl ReportArgs {
    /// Configuration file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> crate::Result<DriftConfig> {
        let mut config = match &self.config {
            Some(path) => DriftConfig::from_yaml_file(path)?,
            None => DriftConfig::default(),
        };
        if let Some(bins) = self.bins {
            config.bins = bins;
        }
        if let Some(jsd_bins) = self.jsd_bins {
            config.jsd_bins = jsd_bins;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        for column in &self.exclude {
            if !config.exclude_columns.contains(column) {
                config.exclude_columns.push(column.clone());
            }
        }
        Ok(config)
    }
}

/// Get risk symbol for display.
pub(crate) fn risk_symbol(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "\u{2713}",    // checkmark
        RiskLevel::Medium => "\u{25CF}", // filled circle
        RiskLevel::High => "\u{25B2}",   // triangle
    }
}

/// Compare a baseline against a current (or simulated) dataset.
pub(crate) fn cmd_report(args: &ReportArgs) -> crate::Result<RunStatus> {
    if !matches!(args.format.as_str(), "text" | "json") {
        return Err(crate::Error::invalid_config(format!(
            "Unknown format: {}. Use 'text' or 'json'",
            args.format
        )));
    }

    let config = args.resolve_config()?;
    let thresholds = config.thresholds;
    let detector = DriftDetector::from_config(config)?;
    let exclude = &detector.config().exclude_columns;

    let source = load_table(&args.baseline)?;
    let baseline = add_gaussian_noise(
        &source,
        NoiseConfig::new(args.baseline_noise_std, args.baseline_seed),
        exclude,
    )?;
    let (current, current_label) = match &args.current {
        Some(path) => (load_table(path)?, path.display().to_string()),
        None => {
            let noise = NoiseConfig::new(args.noise_std, args.seed);
            tracing::info!(
                std_dev = noise.std_dev,
                seed = noise.seed,
                "no current dataset given, simulating one from the baseline"
            );
            let label = format!(
                "simulated from baseline (noise std {}, seed {})",
                noise.std_dev, noise.seed
            );
            (add_gaussian_noise(&source, noise, exclude)?, label)
        }
    };

    let report = detector.detect(&baseline, &current)?;

    if let Some(output) = &args.output {
        report.write_json(output)?;
    }

    if args.format == "json" {
        println!("{}", report.to_json_pretty()?);
    } else {
        let baseline_label = args.baseline.display().to_string();
        print!(
            "{}",
            render_text(&report, &thresholds, &baseline_label, &current_label)
        );
        if let Some(output) = &args.output {
            println!("Drift report written to: {}", output.display());
        }
    }

    match args.fail_on {
        Some(level) if report.overall_risk >= level => {
            tracing::warn!(
                overall_risk = %report.overall_risk,
                fail_on = %level,
                "overall risk reached the failure level"
            );
            Ok(RunStatus::RiskThresholdReached)
        }
        _ => Ok(RunStatus::Ok),
    }
}

/// Human-readable report table.
pub(crate) fn render_text(
    report: &DriftReport,
    thresholds: &RiskThresholds,
    baseline: &str,
    current: &str,
) -> String {
    let summary = &report.summary;
    let mut out = String::from("Drift Report\n============\n");
    out.push_str(&format!(
        "Baseline:  {} ({} rows)\n",
        baseline, summary.baseline_rows
    ));
    out.push_str(&format!(
        "Current:   {} ({} rows)\n",
        current, summary.current_rows
    ));
    out.push_str(&format!(
        "Generated: {}\n\n",
        report.generated_at.to_rfc3339()
    ));

    out.push_str(&format!(
        "{:<20} {:<12} {:<10} {:<10} {:<8} {:<8} {:<8} JSD RISK\n",
        "FEATURE", "KIND", "PSI", "JSD", "NULL(B)", "NULL(C)", "RISK"
    ));
    out.push_str(&format!("{}\n", "-".repeat(90)));
    for feature in &report.features {
        out.push_str(&format!(
            "{:<20} {:<12} {:<10.4} {:<10.4} {:<8.3} {:<8.3} {:<8} {} {}\n",
            feature.feature_name,
            feature.kind.as_str(),
            feature.psi,
            feature.jsd,
            feature.baseline_null_rate,
            feature.current_null_rate,
            feature.risk_level.as_str(),
            feature.jsd_risk(thresholds).as_str(),
            risk_symbol(feature.risk_level),
        ));
    }

    let agg = &report.aggregate;
    out.push_str(&format!(
        "\nPSI mean {:.4}  p95 {:.4}    JSD mean {:.4}  p95 {:.4}\n",
        agg.psi_mean, agg.psi_p95, agg.jsd_mean, agg.jsd_p95
    ));
    out.push_str(&format!(
        "Null rate: baseline {:.4}  current {:.4} ({} common columns)\n",
        summary.baseline_null_rate, summary.current_null_rate, summary.common_columns
    ));
    out.push_str(&format!(
        "Overall risk: {} {}\n",
        report.overall_risk.as_str().to_uppercase(),
        risk_symbol(report.overall_risk)
    ));

    let flagged: Vec<&str> = report
        .features
        .iter()
        .filter(|f| !f.quality.is_clean())
        .map(|f| f.feature_name.as_str())
        .collect();
    if !flagged.is_empty() {
        out.push_str(&format!("Quality flags: {}\n", flagged.join(", ")));
    }
    if !summary.excluded_columns.is_empty() {
        out.push_str(&format!(
            "Excluded: {}\n",
            summary.excluded_columns.join(", ")
        ));
    }
    if report.degraded {
        out.push_str("\u{26A0}\u{FE0F}  DEGRADED: some features were not scored\n");
        for warning in &report.warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
    }
    out
}
