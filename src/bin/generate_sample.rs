//! Generate a small demo dataset for the raincloud viewer.
//!
//! Writes `sample_measurements.parquet` to the current directory: four
//! numeric columns with visibly different distributions plus one text
//! column, so the feature panel has something to drop.

use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROWS: usize = 300;

/// Standard-normal draw via Box-Muller.
fn gauss(rng: &mut StdRng, mu: f64, sigma: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mu + sigma * z
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(1234);

    // Unimodal, bimodal, skewed, and wide-range columns.
    let height: Vec<f64> = (0..ROWS).map(|_| gauss(&mut rng, 170.0, 8.0)).collect();
    let reaction_time: Vec<f64> = (0..ROWS)
        .map(|i| {
            if i % 2 == 0 {
                gauss(&mut rng, 250.0, 20.0)
            } else {
                gauss(&mut rng, 340.0, 25.0)
            }
        })
        .collect();
    let income: Vec<f64> = (0..ROWS)
        .map(|_| gauss(&mut rng, 10.4, 0.6).exp())
        .collect();
    let score: Vec<f64> = (0..ROWS)
        .map(|_| {
            let base: f64 = rng.gen_range(0.0..1.0);
            100.0 * base.powf(0.5)
        })
        .collect();
    let group: Vec<String> = (0..ROWS)
        .map(|i| ["control", "treated"][i % 2].to_string())
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("height", DataType::Float64, false),
        Field::new("reaction_time", DataType::Float64, false),
        Field::new("income", DataType::Float64, false),
        Field::new("score", DataType::Float64, false),
        Field::new("group", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(height)),
            Arc::new(Float64Array::from(reaction_time)),
            Arc::new(Float64Array::from(income)),
            Arc::new(Float64Array::from(score)),
            Arc::new(StringArray::from(group)),
        ],
    )?;

    let path = "sample_measurements.parquet";
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("Wrote {ROWS} rows to {path}");
    Ok(())
}
