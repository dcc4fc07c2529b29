//! In-memory tables compared by the drift engine.
//!
//! A [`Table`] is the materialized form of a dataset: ordered, named
//! columns of [`Cell`]s. Column kinds are not stored here; they are decided
//! once when two tables are aligned (see [`crate::loader::align`]).

use std::{borrow::Cow, collections::HashSet};

use arrow::{
    array::{Array, ArrayRef, AsArray},
    compute::cast,
    datatypes::{DataType, Float64Type},
    util::display::array_value_to_string,
};

use crate::{
    dataset::ArrowDataset,
    error::{Error, Result},
};

/// A single value in a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing value.
    Null,
    /// Finite numeric reading.
    Number(f64),
    /// Anything else, kept verbatim.
    Text(String),
}

impl Cell {
    /// Build a numeric cell. NaN and infinities are stored as [`Cell::Null`].
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Null
        }
    }

    /// Build a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for [`Cell::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric reading of the cell, parsing text when possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Category key of the cell. Numbers use their shortest decimal form, so
    /// `Number(1.0)` and `Text("1")` land in the same category.
    pub fn category(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Number(v) => Some(Cow::Owned(v.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::number)
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Null, Self::text)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    /// Create a column from cells.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Create a numeric column; `None` is a null.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(name, values.into_iter().map(Cell::from).collect())
    }

    /// Create a fully populated numeric column.
    pub fn from_f64(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(Cell::number).collect())
    }

    /// Create a text column; `None` is a null.
    pub fn text<'a>(name: impl Into<String>, values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::new(name, values.into_iter().map(Cell::from).collect())
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cells in row order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable cells, used by the production simulator.
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }
}

/// An ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Create a table from columns.
    ///
    /// # Errors
    ///
    /// Returns a schema error when there are no columns, no rows, columns of
    /// different lengths, or duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(Error::schema("dataset has no columns"));
        };
        let num_rows = first.len();
        if num_rows == 0 {
            return Err(Error::schema("dataset has no rows"));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != num_rows {
                return Err(Error::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    num_rows
                )));
            }
            if !seen.insert(column.name()) {
                return Err(Error::schema(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        Ok(Self { columns, num_rows })
    }

    /// Materialize an Arrow dataset.
    ///
    /// Integer, float and decimal arrays become [`Cell::Number`]; every other
    /// type is rendered to [`Cell::Text`] with Arrow's display formatting.
    ///
    /// # Errors
    ///
    /// Returns an Arrow error if a column cannot be cast or rendered, or a
    /// schema error if the result has no columns or rows.
    pub fn from_arrow(dataset: &ArrowDataset) -> Result<Self> {
        let schema = dataset.schema();
        let mut columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|field| Column::new(field.name().clone(), Vec::with_capacity(dataset.len())))
            .collect();

        for batch in dataset.batches() {
            for (column, array) in columns.iter_mut().zip(batch.columns()) {
                append_cells(&mut column.cells, array)?;
            }
        }

        Self::new(columns)
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

fn append_cells(cells: &mut Vec<Cell>, array: &ArrayRef) -> Result<()> {
    match array.data_type() {
        DataType::Null => cells.extend(std::iter::repeat(Cell::Null).take(array.len())),
        dt if dt.is_numeric() => {
            let floats = cast(array, &DataType::Float64)?;
            let floats = floats.as_primitive::<Float64Type>();
            cells.extend((0..floats.len()).map(|i| {
                if floats.is_null(i) {
                    Cell::Null
                } else {
                    Cell::number(floats.value(i))
                }
            }));
        }
        _ => {
            for i in 0..array.len() {
                if array.is_null(i) {
                    cells.push(Cell::Null);
                } else {
                    cells.push(Cell::Text(array_value_to_string(array, i)?));
                }
            }
        }
    }
    Ok(())
}
