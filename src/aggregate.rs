//! Aggregation and risk classification.
//!
//! Rolls per-feature scores into mean and 95th percentile, and maps scores
//! to [`RiskLevel`]s using [`RiskThresholds`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::RiskThresholds,
    error::{Error, Result},
    report::FeatureReport,
};

/// Drift risk of a feature or a whole report. Ordered from best to worst.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Score below the medium threshold.
    #[default]
    Low,
    /// Score within the medium band, both ends inclusive.
    Medium,
    /// Score above the medium band.
    High,
}

impl RiskLevel {
    /// Classify a PSI score.
    ///
    /// `psi < psi_medium` is low, `psi_medium <= psi <= psi_high` is medium,
    /// anything larger is high.
    pub fn from_psi(psi: f64, thresholds: &RiskThresholds) -> Self {
        classify(psi, thresholds.psi_medium, thresholds.psi_high)
    }

    /// Classify a JSD score with the same band rules as PSI.
    pub fn from_jsd(jsd: f64, thresholds: &RiskThresholds) -> Self {
        classify(jsd, thresholds.jsd_medium, thresholds.jsd_high)
    }

    /// Worst level of a set, or `None` when the set is empty.
    pub fn worst(levels: impl IntoIterator<Item = Self>) -> Option<Self> {
        levels.into_iter().max()
    }

    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

fn classify(score: f64, medium: f64, high: f64) -> RiskLevel {
    if score < medium {
        RiskLevel::Low
    } else if score <= high {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::invalid_config(format!(
                "unknown risk level '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Summary statistics over all scored features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    /// Mean PSI.
    pub psi_mean: f64,
    /// 95th percentile PSI.
    pub psi_p95: f64,
    /// Mean JSD.
    pub jsd_mean: f64,
    /// 95th percentile JSD.
    pub jsd_p95: f64,
}

impl AggregateScores {
    /// Aggregate feature reports, which must already be sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an aggregation error when `features` is empty.
    pub fn from_features(features: &[FeatureReport]) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::aggregation("no scored features to aggregate"));
        }
        let psi: Vec<f64> = features.iter().map(|f| f.psi).collect();
        let jsd: Vec<f64> = features.iter().map(|f| f.jsd).collect();

        Ok(Self {
            psi_mean: mean(&psi).unwrap_or_default(),
            psi_p95: percentile(&psi, 0.95).unwrap_or_default(),
            jsd_mean: mean(&jsd).unwrap_or_default(),
            jsd_p95: percentile(&jsd, 0.95).unwrap_or_default(),
        })
    }
}

/// Arithmetic mean, summed in input order.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile `q` (in `[0, 1]`) with linear interpolation between the two
/// nearest ranks, `rank = q · (n - 1)`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
