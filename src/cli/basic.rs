//! Basic CLI commands for dataset inspection.

use std::path::Path;

use crate::{
    drift::null_rate,
    loader::{load_dataset, FeatureKind},
    table::Table,
};

/// Get format name from file extension.
pub(crate) fn get_format(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => "Parquet",
        Some("csv") => "CSV",
        Some("json" | "jsonl") => "JSON",
        _ => "Unknown",
    }
}

/// Display dataset schema with the feature kind inferred for each column.
pub(crate) fn cmd_schema(path: &Path) -> crate::Result<()> {
    let dataset = load_dataset(path)?;
    let table = Table::from_arrow(&dataset)?;
    print!("{}", render_schema(path, &dataset.schema(), &table));
    Ok(())
}

fn render_schema(path: &Path, schema: &arrow::datatypes::Schema, table: &Table) -> String {
    let mut out = format!(
        "Schema for {} ({}, {} rows):\n\n",
        path.display(),
        get_format(path),
        table.num_rows()
    );

    out.push_str(&format!(
        "  {:<4} {:<24} {:<12} {:<12} {:>9}\n",
        "#", "COLUMN", "ARROW TYPE", "KIND", "NULL RATE"
    ));
    for (i, (field, column)) in schema.fields().iter().zip(table.columns()).enumerate() {
        out.push_str(&format!(
            "  {:<4} {:<24} {:<12} {:<12} {:>9.3}\n",
            i,
            field.name(),
            field.data_type().to_string(),
            FeatureKind::infer(column).as_str(),
            null_rate(column)
        ));
    }

    out.push_str(&format!("\nTotal columns: {}\n", table.num_columns()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_format() {
        assert_eq!(get_format(Path::new("a.parquet")), "Parquet");
        assert_eq!(get_format(Path::new("a.csv")), "CSV");
        assert_eq!(get_format(Path::new("a.jsonl")), "JSON");
        assert_eq!(get_format(Path::new("a.xlsx")), "Unknown");
    }

    #[test]
    fn test_render_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline.csv");
        std::fs::write(&path, "age,segment\n20,a\n,b\n30,a\n40,\n").unwrap();

        let dataset = load_dataset(&path).unwrap();
        let table = Table::from_arrow(&dataset).unwrap();
        let text = render_schema(&path, &dataset.schema(), &table);

        assert!(text.contains("CSV, 4 rows"));
        let age = text.lines().find(|l| l.contains(" age ")).unwrap();
        assert!(age.contains("numeric"));
        assert!(age.contains("0.250"));
        let segment = text.lines().find(|l| l.contains(" segment ")).unwrap();
        assert!(segment.contains("categorical"));
        assert!(text.contains("Total columns: 2"));
    }

    #[test]
    fn test_cmd_schema_unsupported_format() {
        let result = cmd_schema(Path::new("data.xlsx"));
        assert!(matches!(
            result,
            Err(crate::Error::UnsupportedFormat { .. })
        ));
    }
}
