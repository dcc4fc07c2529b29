//! Drift detection between a baseline and a current dataset.
//!
//! Compares two [`Table`]s feature by feature and scores each shared column
//! with the Population Stability Index (PSI) and the Jensen-Shannon
//! divergence (JSD), alongside null-rate and quality profiling. Scores are
//! rolled up into a [`DriftReport`] with an overall risk level.
//!
//! # Example
//!
//! ```
//! use derivar::{drift::DriftDetector, Column, RiskLevel, Table};
//!
//! let baseline = Table::new(vec![Column::from_f64(
//!     "age",
//!     &[20.0, 22.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0],
//! )])?;
//! let current = Table::new(vec![Column::from_f64(
//!     "age",
//!     &[40.0, 42.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0],
//! )])?;
//!
//! let report = DriftDetector::new().detect(&baseline, &current)?;
//! assert_eq!(report.overall_risk, RiskLevel::High);
//! # Ok::<(), derivar::Error>(())
//! ```

// Statistical computation requires casts between counts and floats
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]

mod binning;
mod divergence;
mod feature;
mod quality;


use chrono::{DateTime, Utc};

pub use binning::{value_range, CategoricalBins, Histogram, NumericBins};
pub use divergence::{jensen_shannon_divergence, population_stability_index};
use feature::{score_feature, FeatureOutcome};
pub use quality::{null_rate, QualityFlags};

use crate::{
    aggregate::{mean, AggregateScores, RiskLevel},
    config::{DriftConfig, RiskThresholds},
    error::{Error, Result},
    loader::{align, FeatureKind, FeaturePair},
    report::{DatasetSummary, DriftReport, FeatureReport},
    table::{Column, Table},
};

/// Drift detector over a fixed configuration.
///
/// The detector holds no data; the same instance can compare any number of
/// dataset pairs.
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    config: DriftConfig,
}

impl DriftDetector {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an invalid-config error if the configuration fails validation.
    pub fn from_config(config: DriftConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Set the number of PSI bins.
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.config.bins = bins;
        self
    }

    /// Set the number of JSD bins.
    #[must_use]
    pub fn with_jsd_bins(mut self, bins: usize) -> Self {
        self.config.jsd_bins = bins;
        self
    }

    /// Set the PSI probability floor.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set the risk thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Set the number of scoring threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Skip a shared column.
    #[must_use]
    pub fn with_excluded_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.config.exclude_columns.contains(&column) {
            self.config.exclude_columns.push(column);
        }
        self
    }

    /// Skip several shared columns.
    #[must_use]
    pub fn with_excluded_columns<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        columns
            .into_iter()
            .fold(self, |detector, column| detector.with_excluded_column(column))
    }

    /// Current configuration.
    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Compare `current` against `baseline`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`DriftDetector::detect_at`].
    pub fn detect(&self, baseline: &Table, current: &Table) -> Result<DriftReport> {
        self.detect_at(baseline, current, Utc::now())
    }

    /// Compare `current` against `baseline` with a fixed report timestamp.
    ///
    /// # Errors
    ///
    /// Returns an invalid-config error for a bad configuration, a schema
    /// error when the tables share no scorable column names, and an
    /// aggregation error when no shared feature has usable data.
    pub fn detect_at(
        &self,
        baseline: &Table,
        current: &Table,
        generated_at: DateTime<Utc>,
    ) -> Result<DriftReport> {
        self.config.validate()?;
        let alignment = align(baseline, current, &self.config.exclude_columns)?;

        let mut features = Vec::with_capacity(alignment.features.len());
        let mut warnings = Vec::new();
        for outcome in self.score_all(&alignment.features) {
            match outcome {
                FeatureOutcome::Scored(report) => features.push(report),
                FeatureOutcome::Excluded(warning) => {
                    tracing::warn!(feature = warning.feature(), "{warning}");
                    warnings.push(warning);
                }
            }
        }

        if features.is_empty() {
            return Err(Error::aggregation(format!(
                "0 of {} shared features could be scored",
                alignment.features.len()
            )));
        }

        features.sort_by(|a, b| a.feature_name.cmp(&b.feature_name));
        warnings.sort_by(|a, b| a.feature().cmp(b.feature()));

        let aggregate = AggregateScores::from_features(&features)?;
        let overall_risk =
            RiskLevel::worst(features.iter().map(|f| f.risk_level)).unwrap_or_default();

        let (baseline_null_rate, current_null_rate) = common_null_rates(baseline, current);
        let summary = DatasetSummary {
            baseline_rows: baseline.num_rows(),
            current_rows: current.num_rows(),
            common_columns: alignment.features.len() + alignment.excluded.len(),
            baseline_only: alignment.baseline_only,
            current_only: alignment.current_only,
            excluded_columns: alignment.excluded,
            baseline_null_rate,
            current_null_rate,
        };

        tracing::info!(
            features = features.len(),
            excluded = warnings.len(),
            psi_mean = aggregate.psi_mean,
            psi_p95 = aggregate.psi_p95,
            jsd_mean = aggregate.jsd_mean,
            jsd_p95 = aggregate.jsd_p95,
            baseline_null_rate,
            current_null_rate,
            overall_risk = %overall_risk,
            "drift report computed"
        );

        Ok(DriftReport {
            generated_at,
            features,
            aggregate,
            overall_risk,
            degraded: !warnings.is_empty(),
            warnings,
            summary,
        })
    }

    /// Score every pair, sequentially or across scoped worker threads.
    /// Output order follows input order either way.
    fn score_all(&self, pairs: &[FeaturePair<'_>]) -> Vec<FeatureOutcome> {
        let workers = self.config.workers.min(pairs.len()).max(1);
        if workers == 1 {
            return pairs
                .iter()
                .map(|pair| score_feature(pair, &self.config))
                .collect();
        }

        let chunk_size = pairs.len().div_ceil(workers);
        let config = &self.config;
        std::thread::scope(|scope| {
            let handles: Vec<_> = pairs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|pair| score_feature(pair, config))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(outcomes) => outcomes,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

/// Mean per-column null rate of each side over the columns both share,
/// excluded columns included.
fn common_null_rates(baseline: &Table, current: &Table) -> (f64, f64) {
    let (baseline_rates, current_rates): (Vec<f64>, Vec<f64>) = baseline
        .columns()
        .iter()
        .filter_map(|column| {
            current
                .column(column.name())
                .map(|other| (null_rate(column), null_rate(other)))
        })
        .unzip();
    (
        mean(&baseline_rates).unwrap_or(0.0),
        mean(&current_rates).unwrap_or(0.0),
    )
}

/// Score a single pair of columns outside a full comparison.
///
/// Returns `None` when either side lacks usable data.
pub fn score_columns(
    name: &str,
    baseline: &Column,
    current: &Column,
    config: &DriftConfig,
) -> Option<FeatureReport> {
    let pair = FeaturePair {
        name,
        kind: FeatureKind::infer(baseline),
        baseline,
        current,
    };
    match score_feature(&pair, config) {
        FeatureOutcome::Scored(report) => Some(report),
        FeatureOutcome::Excluded(_) => None,
    }
}
