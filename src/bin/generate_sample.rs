use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use log::info;
use parquet::arrow::ArrowWriter;

use cell_matcher::data::model::RawRow;

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic cell measurement batch")]
struct Args {
    /// Output file (.csv or .parquet)
    #[arg(default_value = "sample_cells.csv")]
    output: PathBuf,

    /// Number of cells
    #[arg(long, default_value_t = 420)]
    count: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Cells given a 10x short-term resistance
    #[arg(long, default_value_t = 3)]
    outliers: usize,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Whether row `i` of `count` is one of the `outliers` evenly spaced inflated
/// rows. Never marks more than `outliers.min(count)` rows.
fn is_inflated(i: usize, count: usize, outliers: usize) -> bool {
    let outliers = outliers.min(count);
    if outliers == 0 {
        return false;
    }
    let stride = count / outliers;
    i / stride < outliers && i % stride == stride / 2
}

/// Cells numbered from 1. `lt` falls with `v0`; evenly spaced cells get a
/// 10x `st`.
fn generate_cells(args: &Args) -> Vec<RawRow> {
    let mut rng = SimpleRng::new(args.seed);

    (0..args.count)
        .map(|i| {
            let v0 = rng.gauss(3.60, 0.02);
            let mut st = rng.gauss(0.020, 0.0008);
            if is_inflated(i, args.count, args.outliers) {
                st *= 10.0;
            }
            let lt = 0.012 - 0.01 * (v0 - 3.60) + rng.gauss(0.0, 0.0005);
            RawRow {
                num: i as i64 + 1,
                v0,
                res_st: st,
                res_lt: st + lt,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[RawRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[RawRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("num", DataType::Int64, false),
        Field::new("v0", DataType::Float64, false),
        Field::new("res_st", DataType::Float64, false),
        Field::new("res_lt", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.num))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.v0))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.res_st))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.res_lt))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = generate_cells(&args);
    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    info!(
        "seed {}, {} outliers",
        args.seed,
        args.outliers.min(args.count)
    );
    println!("Wrote {} cells to {}", rows.len(), args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inflated_count(count: usize, outliers: usize) -> usize {
        (0..count).filter(|&i| is_inflated(i, count, outliers)).count()
    }

    #[test]
    fn marks_exactly_the_requested_outliers() {
        for (count, outliers) in [(420, 3), (10, 3), (10, 4), (7, 7), (36, 5)] {
            assert_eq!(inflated_count(count, outliers), outliers, "{count}/{outliers}");
        }
    }

    #[test]
    fn outliers_are_capped_at_count() {
        assert_eq!(inflated_count(5, 50), 5);
        assert_eq!(inflated_count(0, 3), 0);
        assert_eq!(inflated_count(12, 0), 0);
    }

    #[test]
    fn generated_rows_follow_the_mark() {
        let args = Args {
            output: PathBuf::from("cells.csv"),
            count: 4,
            seed: 7,
            outliers: 10,
        };
        let rows = generate_cells(&args);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.res_st > 0.1));
    }
}
