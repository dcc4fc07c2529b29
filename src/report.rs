//! Drift report types and JSON persistence.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::{AggregateScores, RiskLevel},
    config::RiskThresholds,
    drift::QualityFlags,
    error::{Error, Result},
    loader::FeatureKind,
};

/// Scores for one compared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    /// Column name, unique within a report.
    pub feature_name: String,
    /// Kind inferred from the baseline column.
    pub kind: FeatureKind,
    /// Population Stability Index of current against baseline.
    pub psi: f64,
    /// Jensen-Shannon divergence in bits.
    pub jsd: f64,
    /// Null fraction of the baseline column.
    pub baseline_null_rate: f64,
    /// Null fraction of the current column.
    pub current_null_rate: f64,
    /// Risk derived from `psi`.
    pub risk_level: RiskLevel,
    /// Quality flags for the current column.
    #[serde(default)]
    pub quality: QualityFlags,
}

impl FeatureReport {
    /// Risk of the JSD score alone, for display next to the PSI-driven level.
    pub fn jsd_risk(&self, thresholds: &RiskThresholds) -> RiskLevel {
        RiskLevel::from_jsd(self.jsd, thresholds)
    }
}

/// Something that kept a feature out of the scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// A shared column had no usable data on one side.
    FeatureExcluded {
        /// Column name.
        feature: String,
        /// Human-readable cause.
        reason: String,
    },
}

impl ReportWarning {
    /// Column the warning is about.
    pub fn feature(&self) -> &str {
        match self {
            Self::FeatureExcluded { feature, .. } => feature,
        }
    }
}

impl std::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FeatureExcluded { feature, reason } => {
                write!(f, "feature '{feature}' excluded: {reason}")
            }
        }
    }
}

/// Shape of the two compared datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Rows in the baseline table.
    pub baseline_rows: usize,
    /// Rows in the current table.
    pub current_rows: usize,
    /// Columns present on both sides, excluded ones included.
    pub common_columns: usize,
    /// Columns present only in the baseline.
    pub baseline_only: Vec<String>,
    /// Columns present only in the current table.
    pub current_only: Vec<String>,
    /// Shared columns skipped by configuration.
    pub excluded_columns: Vec<String>,
    /// Mean baseline null rate over the common columns; 0 when none.
    #[serde(default)]
    pub baseline_null_rate: f64,
    /// Mean current null rate over the common columns; 0 when none.
    #[serde(default)]
    pub current_null_rate: f64,
}

/// Result of comparing a current dataset against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Scored features, sorted by name.
    pub features: Vec<FeatureReport>,
    /// Mean and 95th percentile of the scores.
    pub aggregate: AggregateScores,
    /// Worst per-feature risk.
    pub overall_risk: RiskLevel,
    /// True when at least one feature was excluded from scoring.
    #[serde(default)]
    pub degraded: bool,
    /// Excluded features and other non-fatal problems.
    #[serde(default)]
    pub warnings: Vec<ReportWarning>,
    /// Shape of the inputs.
    #[serde(default)]
    pub summary: DatasetSummary,
}

impl DriftReport {
    /// Look up a feature by name. Does not rely on `features` being sorted,
    /// so parsed reports from other producers work too.
    pub fn feature(&self, name: &str) -> Option<&FeatureReport> {
        self.features.iter().find(|f| f.feature_name == name)
    }

    /// Features at exactly `level`.
    pub fn features_at(&self, level: RiskLevel) -> impl Iterator<Item = &FeatureReport> {
        self.features.iter().filter(move |f| f.risk_level == level)
    }

    /// Returns true for a low-risk report with no excluded features.
    pub fn is_clean(&self) -> bool {
        self.overall_risk == RiskLevel::Low && !self.degraded
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a report from JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error for malformed input.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the report as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be written.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent))?;
        }
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| Error::io(e, path))?;
        tracing::info!(path = %path.display(), "wrote drift report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn feature(name: &str, psi: f64, risk_level: RiskLevel) -> FeatureReport {
        FeatureReport {
            feature_name: name.to_string(),
            kind: FeatureKind::Numeric,
            psi,
            jsd: 0.02,
            baseline_null_rate: 0.0,
            current_null_rate: 0.05,
            risk_level,
            quality: QualityFlags::default(),
        }
    }

    fn report() -> DriftReport {
        DriftReport {
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            features: vec![
                feature("age", 0.3, RiskLevel::High),
                feature("income", 0.01, RiskLevel::Low),
            ],
            aggregate: AggregateScores {
                psi_mean: 0.155,
                psi_p95: 0.2855,
                jsd_mean: 0.02,
                jsd_p95: 0.02,
            },
            overall_risk: RiskLevel::High,
            degraded: true,
            warnings: vec![ReportWarning::FeatureExcluded {
                feature: "notes".to_string(),
                reason: "baseline has no non-null values".to_string(),
            }],
            summary: DatasetSummary {
                baseline_rows: 10,
                current_rows: 10,
                common_columns: 3,
                baseline_null_rate: 0.25,
                current_null_rate: 0.5,
                ..DatasetSummary::default()
            },
        }
    }

    #[test]
    fn test_json_wire_keys() {
        let value: serde_json::Value =
            serde_json::from_str(&report().to_json_pretty().unwrap()).unwrap();

        assert_eq!(value["generated_at"], "2024-05-01T12:00:00Z");
        assert_eq!(value["overall_risk"], "high");
        assert_eq!(value["degraded"], true);

        let age = &value["features"][0];
        assert_eq!(age["feature_name"], "age");
        assert_eq!(age["kind"], "numeric");
        assert_eq!(age["risk_level"], "high");
        assert_eq!(age["current_null_rate"], 0.05);
        assert_eq!(age["quality"]["out_of_range_rate"], 0.0);

        assert_eq!(value["aggregate"]["psi_mean"], 0.155);
        assert_eq!(value["warnings"][0]["kind"], "feature_excluded");
        assert_eq!(value["warnings"][0]["feature"], "notes");
        assert_eq!(value["summary"]["common_columns"], 3);
        assert_eq!(value["summary"]["baseline_null_rate"], 0.25);
        assert_eq!(value["summary"]["current_null_rate"], 0.5);
    }

    #[test]
    fn test_parse_minimal_report() {
        let json = r#"{
            "generated_at": "2024-05-01T12:00:00Z",
            "features": [{"feature_name": "age", "kind": "numeric", "psi": 0.0,
                          "jsd": 0.0, "baseline_null_rate": 0.0,
                          "current_null_rate": 0.0, "risk_level": "low"}],
            "aggregate": {"psi_mean": 0.0, "psi_p95": 0.0, "jsd_mean": 0.0, "jsd_p95": 0.0},
            "overall_risk": "low"
        }"#;
        let parsed = DriftReport::from_json_str(json).unwrap();
        assert!(parsed.is_clean());
        assert!(parsed.warnings.is_empty());
        assert!(parsed.feature("age").unwrap().quality.is_clean());
    }

    #[test]
    fn test_json_round_trip() {
        let original = report();
        let parsed = DriftReport::from_json_str(&original.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_feature_lookup_and_filter() {
        let report = report();
        assert_eq!(report.feature("income").unwrap().psi, 0.01);
        assert!(report.feature("missing").is_none());
        let high: Vec<_> = report
            .features_at(RiskLevel::High)
            .map(|f| f.feature_name.as_str())
            .collect();
        assert_eq!(high, vec!["age"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_feature_lookup_in_unsorted_report() {
        let json = r#"{
            "generated_at": "2024-05-01T12:00:00Z",
            "features": [
                {"feature_name": "zip", "kind": "categorical", "psi": 0.0, "jsd": 0.0,
                 "baseline_null_rate": 0.0, "current_null_rate": 0.0, "risk_level": "low"},
                {"feature_name": "age", "kind": "numeric", "psi": 0.4, "jsd": 0.2,
                 "baseline_null_rate": 0.0, "current_null_rate": 0.0, "risk_level": "high"},
                {"feature_name": "income", "kind": "numeric", "psi": 0.0, "jsd": 0.0,
                 "baseline_null_rate": 0.0, "current_null_rate": 0.0, "risk_level": "low"}
            ],
            "aggregate": {"psi_mean": 0.13, "psi_p95": 0.36, "jsd_mean": 0.07, "jsd_p95": 0.18},
            "overall_risk": "high",
            "summary": {"baseline_rows": 3, "current_rows": 3, "common_columns": 3,
                        "baseline_only": [], "current_only": [], "excluded_columns": []}
        }"#;
        let parsed = DriftReport::from_json_str(json).unwrap();
        assert_eq!(parsed.feature("age").unwrap().psi, 0.4);
        assert_eq!(parsed.feature("zip").unwrap().kind, FeatureKind::Categorical);
        assert!(parsed.feature("income").is_some());
        assert_eq!(parsed.summary.baseline_null_rate, 0.0);
    }

    #[test]
    fn test_jsd_risk() {
        let f = feature("age", 0.0, RiskLevel::Low);
        assert_eq!(f.jsd_risk(&RiskThresholds::default()), RiskLevel::Low);
    }

    #[test]
    fn test_warning_display() {
        let warning = &report().warnings[0];
        assert_eq!(warning.feature(), "notes");
        assert!(warning.to_string().contains("'notes' excluded"));
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/drift_report.json");

        report().write_json(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(DriftReport::from_json_str(&written).unwrap(), report());
    }
}
