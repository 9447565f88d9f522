use thiserror::Error;

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

/// Typed payload of a single table column, mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Integer(Vec<i64>),
    Text(Vec<String>),
    Bool(Vec<bool>),
}

impl Column {
    /// Number of cells in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column participates in numeric feature selection.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_) | Column::Integer(_))
    }

    /// The column's values widened to `f64`, or `None` for non-numeric columns.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Numeric(v) => Some(v.clone()),
            Column::Integer(v) => Some(v.iter().map(|&i| i as f64).collect()),
            _ => None,
        }
    }

    /// Human-readable dtype name for the UI.
    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "float",
            Column::Integer(_) => "int",
            Column::Text(_) => "str",
            Column::Bool(_) => "bool",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("column '{name}' has {actual} rows, expected {expected}")]
    RowMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// A numeric feature retained by [`Table::numeric_selection`]: the column
/// name together with its values widened to `f64`.
#[derive(Debug, Clone)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// A column-oriented table with named columns in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<(String, Column)>,
    rows: usize,
}

impl Table {
    /// Build a table from `(name, column)` pairs, preserving their order.
    /// All columns must agree on row count.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self, DataError> {
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        for (name, col) in &columns {
            if col.len() != rows {
                return Err(DataError::RowMismatch {
                    name: name.clone(),
                    expected: rows,
                    actual: col.len(),
                });
            }
        }
        Ok(Table { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Restrict the table to `features` (in request order) and keep only the
    /// numeric columns among them. Non-numeric requested columns are dropped
    /// silently; a column that does not exist at all is an error.
    ///
    /// The returned count drives the lane layout of the raincloud figure.
    pub fn numeric_selection(&self, features: &[String]) -> Result<Vec<FeatureColumn>, DataError> {
        let mut selection = Vec::with_capacity(features.len());
        for name in features {
            let col = self
                .column(name)
                .ok_or_else(|| DataError::MissingColumn(name.clone()))?;
            if let Some(values) = col.as_f64() {
                selection.push(FeatureColumn {
                    name: name.clone(),
                    values,
                });
            }
        }
        Ok(selection)
    }
}
