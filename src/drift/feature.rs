//! Scoring of a single aligned feature.

use std::borrow::Cow;

use super::{
    binning::{value_range, CategoricalBins, Histogram, NumericBins},
    divergence::{jensen_shannon_divergence, population_stability_index},
    quality::{null_rate, QualityFlags},
};
use crate::{
    aggregate::RiskLevel,
    config::DriftConfig,
    loader::{FeatureKind, FeaturePair},
    report::{FeatureReport, ReportWarning},
};

/// Outcome of scoring one feature.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FeatureOutcome {
    Scored(FeatureReport),
    Excluded(ReportWarning),
}

/// Divergence scores plus quality flags, before risk classification.
struct Scores {
    psi: f64,
    jsd: f64,
    quality: QualityFlags,
}

pub(crate) fn score_feature(pair: &FeaturePair<'_>, config: &DriftConfig) -> FeatureOutcome {
    let scores = match pair.kind {
        FeatureKind::Numeric => score_numeric(pair, config),
        FeatureKind::Categorical => score_categorical(pair, config),
    };

    match scores {
        Ok(scores) => {
            let report = FeatureReport {
                feature_name: pair.name.to_string(),
                kind: pair.kind,
                psi: scores.psi,
                jsd: scores.jsd,
                baseline_null_rate: null_rate(pair.baseline),
                current_null_rate: null_rate(pair.current),
                risk_level: RiskLevel::from_psi(scores.psi, &config.thresholds),
                quality: scores.quality,
            };
            tracing::debug!(
                feature = pair.name,
                kind = %pair.kind,
                psi = report.psi,
                jsd = report.jsd,
                risk = %report.risk_level,
                "scored feature"
            );
            FeatureOutcome::Scored(report)
        }
        Err(reason) => FeatureOutcome::Excluded(ReportWarning::FeatureExcluded {
            feature: pair.name.to_string(),
            reason,
        }),
    }
}

fn score_numeric(pair: &FeaturePair<'_>, config: &DriftConfig) -> Result<Scores, String> {
    let baseline: Vec<f64> = pair
        .baseline
        .cells()
        .iter()
        .filter_map(|c| c.as_number())
        .collect();
    let Some((lo, hi)) = value_range(baseline.iter().copied()) else {
        return Err("baseline has no numeric values".to_string());
    };

    // `None` marks a non-null cell that does not read as a number.
    let current: Vec<Option<f64>> = pair
        .current
        .cells()
        .iter()
        .filter(|c| !c.is_null())
        .map(|c| c.as_number())
        .collect();
    if current.is_empty() {
        return Err("current has no non-null values".to_string());
    }

    // PSI: bins over the baseline range, plus a trailing mismatch bucket.
    let psi_bins = NumericBins::new(lo, hi, config.bins);
    let mismatch = psi_bins.count();
    let mut base_hist = Histogram::new(mismatch + 1);
    for &v in &baseline {
        base_hist.add(psi_bins.index(v));
    }
    let mut cur_hist = Histogram::new(mismatch + 1);
    let mut out_of_range = 0;
    let mut type_mismatch = 0;
    for value in &current {
        match *value {
            Some(v) => {
                if v < lo || v > hi {
                    out_of_range += 1;
                }
                cur_hist.add(psi_bins.index(v));
            }
            None => {
                type_mismatch += 1;
                cur_hist.add(mismatch);
            }
        }
    }
    let psi = population_stability_index(&base_hist, &cur_hist, config.epsilon);

    // JSD: bins over the joint range so both sides are treated alike.
    let current_numbers = current.iter().flatten().copied();
    let (jlo, jhi) = value_range(baseline.iter().copied().chain(current_numbers))
        .unwrap_or((lo, hi));
    let jsd_bins = NumericBins::new(jlo, jhi, config.jsd_bins);
    let mismatch = jsd_bins.count();
    let mut p = Histogram::new(mismatch + 1);
    for &v in &baseline {
        p.add(jsd_bins.index(v));
    }
    let mut q = Histogram::new(mismatch + 1);
    for value in &current {
        q.add(value.map_or(mismatch, |v| jsd_bins.index(v)));
    }
    let jsd = jensen_shannon_divergence(&p, &q);

    Ok(Scores {
        psi,
        jsd,
        quality: QualityFlags::from_counts(out_of_range, type_mismatch, current.len()),
    })
}

fn score_categorical(pair: &FeaturePair<'_>, config: &DriftConfig) -> Result<Scores, String> {
    let baseline: Vec<Cow<'_, str>> = pair
        .baseline
        .cells()
        .iter()
        .filter_map(|c| c.category())
        .collect();
    if baseline.is_empty() {
        return Err("baseline has no non-null values".to_string());
    }
    let current: Vec<Cow<'_, str>> = pair
        .current
        .cells()
        .iter()
        .filter_map(|c| c.category())
        .collect();
    if current.is_empty() {
        return Err("current has no non-null values".to_string());
    }

    // PSI: baseline categories in first-seen order, plus an unseen bucket.
    let psi_bins = CategoricalBins::first_seen(baseline.iter().map(|k| &**k));
    let unseen = psi_bins.len();
    let mut base_hist = Histogram::new(unseen + 1);
    for key in &baseline {
        base_hist.add(psi_bins.index(key).unwrap_or(unseen));
    }
    let mut cur_hist = Histogram::new(unseen + 1);
    let mut unseen_count = 0;
    for key in &current {
        let bin = psi_bins.index(key).unwrap_or_else(|| {
            unseen_count += 1;
            unseen
        });
        cur_hist.add(bin);
    }
    let psi = population_stability_index(&base_hist, &cur_hist, config.epsilon);

    // JSD: the sorted union of categories from both sides.
    let union = CategoricalBins::sorted(baseline.iter().chain(&current).map(|k| &**k));
    let mut p = Histogram::new(union.len());
    for key in &baseline {
        if let Some(bin) = union.index(key) {
            p.add(bin);
        }
    }
    let mut q = Histogram::new(union.len());
    for key in &current {
        if let Some(bin) = union.index(key) {
            q.add(bin);
        }
    }
    let jsd = jensen_shannon_divergence(&p, &q);

    Ok(Scores {
        psi,
        jsd,
        quality: QualityFlags::from_counts(unseen_count, 0, current.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn pair<'a>(kind: FeatureKind, baseline: &'a Column, current: &'a Column) -> FeaturePair<'a> {
        FeaturePair {
            name: baseline.name(),
            kind,
            baseline,
            current,
        }
    }

    fn scored(outcome: FeatureOutcome) -> FeatureReport {
        match outcome {
            FeatureOutcome::Scored(report) => report,
            FeatureOutcome::Excluded(warning) => panic!("unexpected exclusion: {warning}"),
        }
    }

    #[test]
    fn test_numeric_out_of_range_rate() {
        let baseline = Column::from_f64("x", &[0.0, 5.0, 10.0]);
        let current = Column::from_f64("x", &[-1.0, 5.0, 10.0, 11.0]);
        let report = scored(score_feature(
            &pair(FeatureKind::Numeric, &baseline, &current),
            &DriftConfig::default(),
        ));
        assert_eq!(report.quality.out_of_range_rate, 0.5);
        assert_eq!(report.quality.type_mismatch_rate, 0.0);
    }

    #[test]
    fn test_numeric_type_mismatch_rate() {
        let baseline = Column::from_f64("x", &[1.0, 2.0, 3.0, 4.0]);
        let current = Column::text("x", vec![Some("1"), Some("abc"), None, Some("3")]);
        let report = scored(score_feature(
            &pair(FeatureKind::Numeric, &baseline, &current),
            &DriftConfig::default(),
        ));
        assert!((report.quality.type_mismatch_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.current_null_rate, 0.25);
        assert!(report.psi > 0.0);
    }

    #[test]
    fn test_categorical_unseen_rate() {
        let baseline = Column::text("c", vec![Some("a"), Some("b")]);
        let current = Column::text("c", vec![Some("a"), Some("z")]);
        let report = scored(score_feature(
            &pair(FeatureKind::Categorical, &baseline, &current),
            &DriftConfig::default(),
        ));
        assert_eq!(report.kind, FeatureKind::Categorical);
        assert_eq!(report.quality.out_of_range_rate, 0.5);
        assert_eq!(report.quality.type_mismatch_rate, 0.0);
    }

    #[test]
    fn test_empty_baseline_is_excluded() {
        let baseline = Column::numeric("x", vec![None, None]);
        let current = Column::from_f64("x", &[1.0, 2.0]);
        let outcome = score_feature(
            &pair(FeatureKind::Numeric, &baseline, &current),
            &DriftConfig::default(),
        );
        assert!(matches!(
            outcome,
            FeatureOutcome::Excluded(ReportWarning::FeatureExcluded { ref reason, .. })
                if reason.contains("baseline")
        ));
    }

    #[test]
    fn test_empty_current_is_excluded() {
        let baseline = Column::text("c", vec![Some("a")]);
        let current = Column::text("c", vec![None]);
        let outcome = score_feature(
            &pair(FeatureKind::Categorical, &baseline, &current),
            &DriftConfig::default(),
        );
        assert!(matches!(outcome, FeatureOutcome::Excluded(_)));
    }
}
