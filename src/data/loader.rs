use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – Parquet file with scalar columns (recommended)
/// * `.json`    – records-oriented array: `[{ "col": value, ... }, ...]`
/// * `.csv`     – header row, one scalar value per cell
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Cell – one scalar value during ingestion, before column dtypes are known
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
}

/// Resolve a column of dynamically-typed cells to a single dtype.
///
/// * all-int, no nulls            → `Integer`
/// * int/float mix or numeric+null → `Numeric` (nulls become NaN)
/// * all-bool, no nulls            → `Bool`
/// * anything else                 → `Text`
fn resolve_column(cells: Vec<Cell>) -> Column {
    let mut all_int = true;
    let mut all_numeric = true;
    let mut all_bool = true;
    let mut has_null = false;

    for cell in &cells {
        match cell {
            Cell::Int(_) => all_bool = false,
            Cell::Float(_) => {
                all_int = false;
                all_bool = false;
            }
            Cell::Bool(_) => {
                all_int = false;
                all_numeric = false;
            }
            Cell::Text(_) => {
                all_int = false;
                all_numeric = false;
                all_bool = false;
            }
            Cell::Null => has_null = true,
        }
    }

    if all_int && !has_null {
        return Column::Integer(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Int(i) => i,
                    _ => unreachable!(),
                })
                .collect(),
        );
    }
    if all_numeric {
        return Column::Numeric(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Int(i) => i as f64,
                    Cell::Float(f) => f,
                    _ => f64::NAN,
                })
                .collect(),
        );
    }
    if all_bool && !has_null {
        return Column::Bool(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Bool(b) => b,
                    _ => unreachable!(),
                })
                .collect(),
        );
    }
    Column::Text(
        cells
            .into_iter()
            .map(|c| match c {
                Cell::Text(s) => s,
                Cell::Int(i) => i.to_string(),
                Cell::Float(f) => f.to_string(),
                Cell::Bool(b) => b.to_string(),
                Cell::Null => String::new(),
            })
            .collect(),
    )
}

/// Assemble a [`Table`] from ordered column names and their collected cells.
fn build_table(names: Vec<String>, mut cells: BTreeMap<String, Vec<Cell>>) -> Result<Table> {
    let columns = names
        .into_iter()
        .map(|name| {
            let col = resolve_column(cells.remove(&name).unwrap_or_default());
            (name, col)
        })
        .collect();
    Table::from_columns(columns).context("assembling table")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "sepal_length": 5.1, "sepal_width": 3.5, "species": "setosa" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    // Column order = first-seen order across records.
    let mut names: Vec<String> = Vec::new();
    let mut cells: BTreeMap<String, Vec<Cell>> = BTreeMap::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !cells.contains_key(key) {
                names.push(key.clone());
                // Backfill rows that predate this column.
                cells.insert(key.clone(), vec![Cell::Null; i]);
            }
        }
        for name in &names {
            let cell = match obj.get(name) {
                Some(val) => json_to_cell(val),
                None => Cell::Null,
            };
            cells.get_mut(name).unwrap().push(cell);
        }
    }

    build_table(names, cells)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Int(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one scalar value per cell.
/// Dtypes are guessed per column: a column is numeric only when every
/// non-empty cell parses as a number.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: BTreeMap<String, Vec<Cell>> =
        headers.iter().map(|h| (h.clone(), Vec::new())).collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields, expected {}",
                record.len(),
                headers.len()
            );
        }
        for (col_idx, value) in record.iter().enumerate() {
            cells
                .get_mut(&headers[col_idx])
                .unwrap()
                .push(guess_cell_type(value));
        }
    }

    build_table(headers, cells)
}

fn guess_cell_type(s: &str) -> Cell {
    let s = s.trim();
    if s.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Cell::Float(f);
    }
    if s == "true" || s == "false" {
        return Cell::Bool(s == "true");
    }
    Cell::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns (floats, ints, strings, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut names: Vec<String> = Vec::new();
    let mut cells: BTreeMap<String, Vec<Cell>> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if names.is_empty() {
            names = schema.fields().iter().map(|f| f.name().clone()).collect();
            for name in &names {
                cells.insert(name.clone(), Vec::new());
            }
        }

        for (col_idx, name) in names.iter().enumerate() {
            let col_array = batch.column(col_idx);
            let out = cells.get_mut(name).unwrap();
            for row in 0..batch.num_rows() {
                out.push(
                    extract_cell(col_array, row)
                        .with_context(|| format!("column '{name}', row {row}"))?,
                );
            }
        }
    }

    build_table(names, cells)
}

/// Extract a single scalar value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                Cell::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                Cell::Text(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Cell::Int(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Cell::Int(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Cell::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Cell::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            Cell::Bool(arr.value(row))
        }
        other => bail!("Unsupported parquet column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_int_column() {
        let col = resolve_column(vec![Cell::Int(1), Cell::Int(2)]);
        assert_eq!(col, Column::Integer(vec![1, 2]));
    }

    #[test]
    fn resolve_mixed_numeric_column() {
        let col = resolve_column(vec![Cell::Int(1), Cell::Float(2.5), Cell::Null]);
        match col {
            Column::Numeric(v) => {
                assert_eq!(v[0], 1.0);
                assert_eq!(v[1], 2.5);
                assert!(v[2].is_nan());
            }
            other => panic!("expected Numeric, got {other:?}"),
        }
    }

    #[test]
    fn resolve_text_wins_over_numbers() {
        let col = resolve_column(vec![Cell::Int(1), Cell::Text("a".into())]);
        assert_eq!(col, Column::Text(vec!["1".into(), "a".into()]));
    }

    #[test]
    fn csv_cell_guessing() {
        assert!(matches!(guess_cell_type("42"), Cell::Int(42)));
        assert!(matches!(guess_cell_type("4.25"), Cell::Float(_)));
        assert!(matches!(guess_cell_type("true"), Cell::Bool(true)));
        assert!(matches!(guess_cell_type(""), Cell::Null));
        assert!(matches!(guess_cell_type("setosa"), Cell::Text(_)));
    }

    #[test]
    fn json_records_to_table() {
        let dir = std::env::temp_dir().join("raincloud_loader_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("records.json");
        std::fs::write(
            &path,
            r#"[{"a": 1.5, "b": "x"}, {"a": 2.5, "b": "y"}]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(table.column("a").unwrap().is_numeric());
        assert!(!table.column("b").unwrap().is_numeric());
    }
}
