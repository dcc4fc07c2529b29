//! derivar - Drift and Data-Quality Scoring in Pure Rust
//!
//! Compares a baseline tabular dataset against a current one and scores
//! every shared feature for distribution shift (PSI, Jensen-Shannon
//! divergence) and data quality (null, out-of-range and type-mismatch
//! rates). Per-feature scores roll up into mean / p95 aggregates and a
//! low / medium / high risk level, emitted as a JSON [`DriftReport`].
//!
//! # Design Principles
//!
//! 1. **Deterministic** - identical inputs give byte-identical reports
//! 2. **Degrade, don't abort** - unusable features are flagged and skipped;
//!    only structural problems fail a run
//! 3. **Arrow in** - CSV, Parquet and JSON Lines through Arrow 53
//!
//! # Quick Start
//!
//! ```no_run
//! use derivar::{load_table, DriftDetector};
//!
//! let baseline = load_table("data/baseline.csv").unwrap();
//! let current = load_table("data/current.parquet").unwrap();
//!
//! let report = DriftDetector::new().detect(&baseline, &current).unwrap();
//! println!("overall risk: {}", report.overall_risk);
//! report.write_json("outputs/drift_report.json").unwrap();
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]

pub mod aggregate;
/// CLI module for command-line interface
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod loader;
pub mod report;
pub mod simulate;
pub mod table;

// Re-exports for convenience
pub use aggregate::{AggregateScores, RiskLevel};
pub use config::{DriftConfig, RiskThresholds};
pub use dataset::{ArrowDataset, CsvOptions};
pub use drift::{DriftDetector, QualityFlags};
pub use error::{Error, Result};
pub use loader::{align, load_dataset, load_table, Alignment, FeatureKind, FeaturePair};
pub use report::{DatasetSummary, DriftReport, FeatureReport, ReportWarning};
pub use simulate::{add_gaussian_noise, NoiseConfig};
pub use table::{Cell, Column, Table};
