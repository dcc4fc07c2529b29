//! Property-based tests for drift scoring.
//!
//! Uses proptest to check score bounds, symmetry and identity across random
//! inputs.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use derivar::{
    drift::{jensen_shannon_divergence, population_stability_index, score_columns, Histogram},
    Column, DriftConfig, DriftDetector, RiskLevel, Table,
};
use proptest::prelude::*;

fn histogram(len: usize) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..1000, len)
}

fn finite_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 1..200)
}

proptest! {
    #[test]
    fn prop_psi_non_negative((b, c) in (1usize..30).prop_flat_map(|n| (histogram(n), histogram(n)))) {
        let psi = population_stability_index(
            &Histogram::from_counts(b),
            &Histogram::from_counts(c),
            1e-6,
        );
        prop_assert!(psi >= 0.0, "psi = {}", psi);
        prop_assert!(psi.is_finite());
    }

    #[test]
    fn prop_jsd_bounded_and_symmetric(
        (p, q) in (1usize..30).prop_flat_map(|n| (histogram(n), histogram(n)))
    ) {
        let p = Histogram::from_counts(p);
        let q = Histogram::from_counts(q);
        let pq = jensen_shannon_divergence(&p, &q);
        let qp = jensen_shannon_divergence(&q, &p);
        prop_assert!((0.0..=1.0).contains(&pq), "jsd = {}", pq);
        prop_assert_eq!(pq, qp);
    }

    #[test]
    fn prop_feature_scores_bounded(baseline in finite_values(), current in finite_values()) {
        let config = DriftConfig::default();
        let report = score_columns(
            "x",
            &Column::from_f64("x", &baseline),
            &Column::from_f64("x", &current),
            &config,
        )
        .unwrap();
        prop_assert!(report.psi >= 0.0);
        prop_assert!((0.0..=1.0).contains(&report.jsd));
        prop_assert!((0.0..=1.0).contains(&report.quality.out_of_range_rate));
    }

    #[test]
    fn prop_feature_jsd_symmetric(a in finite_values(), b in finite_values()) {
        let config = DriftConfig::default();
        let a = Column::from_f64("x", &a);
        let b = Column::from_f64("x", &b);
        let ab = score_columns("x", &a, &b, &config).unwrap();
        let ba = score_columns("x", &b, &a, &config).unwrap();
        prop_assert_eq!(ab.jsd, ba.jsd);
    }

    #[test]
    fn prop_self_comparison_is_zero(
        values in finite_values(),
        categories in prop::collection::vec("[a-e]", 1..50)
    ) {
        let numeric = Column::from_f64("x", &values);
        let categorical = Column::text("c", categories.iter().map(|s| Some(s.as_str())));
        let config = DriftConfig::default();

        for column in [&numeric, &categorical] {
            let report = score_columns(column.name(), column, column, &config).unwrap();
            prop_assert_eq!(report.psi, 0.0);
            prop_assert_eq!(report.jsd, 0.0);
            prop_assert_eq!(report.risk_level, RiskLevel::Low);
        }
    }

    #[test]
    fn prop_worker_count_does_not_change_report(
        columns in prop::collection::vec(prop::collection::vec(0.0f64..100.0, 20), 1..8),
        shift in 0.0f64..50.0,
        workers in 2usize..6
    ) {
        let baseline = Table::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, values)| Column::from_f64(format!("f{i}"), values))
                .collect(),
        )
        .unwrap();
        let current = Table::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, values)| {
                    let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
                    Column::from_f64(format!("f{i}"), &shifted)
                })
                .collect(),
        )
        .unwrap();

        let sequential = DriftDetector::new().detect(&baseline, &current).unwrap();
        let parallel = DriftDetector::new()
            .with_workers(workers)
            .detect(&baseline, &current)
            .unwrap();
        prop_assert_eq!(sequential.features, parallel.features);
        prop_assert_eq!(sequential.aggregate, parallel.aggregate);
    }
}
