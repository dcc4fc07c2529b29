//! Dataset loading and schema alignment.
//!
//! Reads baseline and current files into [`Table`]s and lines them up on
//! their shared column names. Each shared column gets a [`FeatureKind`]
//! inferred once from the baseline; the current side inherits it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    dataset::ArrowDataset,
    error::{Error, Result},
    table::{Column, Table},
};

/// How a feature is binned and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Every non-null baseline value is a number.
    Numeric,
    /// At least one non-null baseline value is not a number.
    Categorical,
}

impl FeatureKind {
    /// Infer the kind of a baseline column.
    ///
    /// A column whose non-null cells all read as numbers is numeric, even
    /// when they are stored as text. An all-null column is numeric too; it
    /// is excluded later for lack of usable data.
    pub fn infer(column: &Column) -> Self {
        let all_numeric = column
            .cells()
            .iter()
            .filter(|c| !c.is_null())
            .all(|c| c.as_number().is_some());
        if all_numeric {
            Self::Numeric
        } else {
            Self::Categorical
        }
    }

    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shared column, ready to be scored.
#[derive(Debug, Clone, Copy)]
pub struct FeaturePair<'a> {
    /// Column name shared by both sides.
    pub name: &'a str,
    /// Kind inferred from the baseline column.
    pub kind: FeatureKind,
    /// Baseline column.
    pub baseline: &'a Column,
    /// Current column.
    pub current: &'a Column,
}

/// Result of lining up a baseline table with a current table.
#[derive(Debug, Clone)]
pub struct Alignment<'a> {
    /// Shared, non-excluded columns in baseline order.
    pub features: Vec<FeaturePair<'a>>,
    /// Columns only present in the baseline.
    pub baseline_only: Vec<String>,
    /// Columns only present in the current table.
    pub current_only: Vec<String>,
    /// Shared columns skipped by configuration.
    pub excluded: Vec<String>,
}

/// Align two tables on their common column names.
///
/// # Errors
///
/// Returns a schema error when the tables share no column, or when every
/// shared column is in `exclude`.
pub fn align<'a>(
    baseline: &'a Table,
    current: &'a Table,
    exclude: &[String],
) -> Result<Alignment<'a>> {
    let mut features = Vec::new();
    let mut baseline_only = Vec::new();
    let mut excluded = Vec::new();

    for column in baseline.columns() {
        let name = column.name();
        let Some(current_column) = current.column(name) else {
            baseline_only.push(name.to_string());
            continue;
        };
        if exclude.iter().any(|e| e == name) {
            excluded.push(name.to_string());
            continue;
        }
        features.push(FeaturePair {
            name,
            kind: FeatureKind::infer(column),
            baseline: column,
            current: current_column,
        });
    }

    let current_only: Vec<String> = current
        .column_names()
        .filter(|name| baseline.column(name).is_none())
        .map(str::to_string)
        .collect();

    if features.is_empty() {
        if excluded.is_empty() {
            return Err(Error::schema(
                "baseline and current datasets share no column names",
            ));
        }
        return Err(Error::schema(format!(
            "every shared column is excluded: {}",
            excluded.join(", ")
        )));
    }

    Ok(Alignment {
        features,
        baseline_only,
        current_only,
        excluded,
    })
}

/// Load an Arrow dataset from a file path based on its extension.
///
/// Supports `csv`, `parquet`, `json` and `jsonl` (JSON Lines).
///
/// # Errors
///
/// Returns an unsupported-format error for other extensions, and loading
/// or schema errors from the reader.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<ArrowDataset> {
    let path = path.as_ref();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "parquet" => ArrowDataset::from_parquet(path),
        "csv" => ArrowDataset::from_csv(path),
        "json" | "jsonl" => ArrowDataset::from_json(path),
        ext => Err(Error::unsupported_format(ext)),
    }
}

/// Load a file (see [`load_dataset`]) and materialize it as a [`Table`].
///
/// # Errors
///
/// Returns the errors of [`load_dataset`] and [`Table::from_arrow`].
pub fn load_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let table = Table::from_arrow(&load_dataset(path)?)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded dataset"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn table(columns: Vec<Column>) -> Table {
        Table::new(columns).unwrap()
    }

    #[test]
    fn test_infer_numeric() {
        let column = Column::numeric("age", vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(FeatureKind::infer(&column), FeatureKind::Numeric);
    }

    #[test]
    fn test_infer_numeric_from_text() {
        let column = Column::text("age", vec![Some("1"), Some("2.5"), None]);
        assert_eq!(FeatureKind::infer(&column), FeatureKind::Numeric);
    }

    #[test]
    fn test_infer_categorical() {
        let column = Column::new(
            "segment",
            vec![Cell::Number(1.0), Cell::text("gold"), Cell::Null],
        );
        assert_eq!(FeatureKind::infer(&column), FeatureKind::Categorical);
    }

    #[test]
    fn test_feature_kind_display() {
        assert_eq!(FeatureKind::Numeric.to_string(), "numeric");
        assert_eq!(FeatureKind::Categorical.to_string(), "categorical");
        assert_eq!(
            serde_json::to_string(&FeatureKind::Categorical).unwrap(),
            "\"categorical\""
        );
    }

    #[test]
    fn test_align_common_columns_in_baseline_order() {
        let baseline = table(vec![
            Column::from_f64("b", &[1.0]),
            Column::from_f64("a", &[1.0]),
            Column::from_f64("only_base", &[1.0]),
        ]);
        let current = table(vec![
            Column::from_f64("a", &[2.0]),
            Column::from_f64("only_cur", &[2.0]),
            Column::text("b", vec![Some("x")]),
        ]);

        let alignment = align(&baseline, &current, &[]).unwrap();
        let names: Vec<_> = alignment.features.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(alignment.baseline_only, vec!["only_base".to_string()]);
        assert_eq!(alignment.current_only, vec!["only_cur".to_string()]);
        // kind comes from the baseline even though current "b" is text
        assert_eq!(alignment.features[0].kind, FeatureKind::Numeric);
    }

    #[test]
    fn test_align_excludes_configured_columns() {
        let baseline = table(vec![
            Column::from_f64("x", &[1.0]),
            Column::from_f64("label", &[0.0]),
        ]);
        let current = baseline.clone();

        let alignment = align(&baseline, &current, &["label".to_string()]).unwrap();
        assert_eq!(alignment.features.len(), 1);
        assert_eq!(alignment.excluded, vec!["label".to_string()]);
    }

    #[test]
    fn test_align_no_overlap_is_schema_error() {
        let baseline = table(vec![Column::from_f64("x", &[1.0])]);
        let current = table(vec![Column::from_f64("y", &[1.0])]);
        assert!(matches!(
            align(&baseline, &current, &[]),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_align_everything_excluded_is_schema_error() {
        let baseline = table(vec![Column::from_f64("label", &[1.0])]);
        let err = align(&baseline, &baseline, &["label".to_string()]).unwrap_err();
        assert!(err.to_string().contains("excluded"));
    }

    #[test]
    fn test_load_table_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.csv");
        std::fs::write(&path, "age,segment\n20,a\n,b\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("age").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_table_unsupported_extension() {
        let result = load_table("baseline.xlsx");
        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    }
}
