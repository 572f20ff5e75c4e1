//! Plot data handed to the external plotting tools: a histogram of `dev_st`
//! and the `dist` vs module scatter.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::state::SortState;

/// One histogram bin, `[start, end)`; the last bin also holds `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]` of `values`.
///
/// A zero-width range collapses into a single bin holding everything.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return vec![Bin {
            bin_start: min,
            bin_end: max,
            count: values.len(),
        }];
    }

    let width = range / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            bin_start: min + width * i as f64,
            bin_end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[derive(Debug, Serialize)]
struct ScatterRow {
    num: i64,
    dist: f64,
    #[serde(rename = "mod")]
    module: u32,
}

/// `bin_start,bin_end,count` rows for the `dev_st` distribution.
pub fn write_dev_st_histogram<W: Write>(state: &SortState, bins: usize, out: W) -> Result<()> {
    let dev_st: Vec<f64> = state.cells.iter().map(|c| c.dev_st).collect();
    let mut writer = csv::Writer::from_writer(out);
    for bin in histogram(&dev_st, bins) {
        writer.serialize(bin).context("writing histogram bin")?;
    }
    writer.flush().context("flushing histogram")?;
    Ok(())
}

/// `num,dist,mod` rows, sorted by id.
pub fn write_dist_scatter<W: Write>(state: &SortState, out: W) -> Result<()> {
    let mut cells: Vec<_> = state.cells.iter().collect();
    cells.sort_by_key(|c| c.id());

    let mut writer = csv::Writer::from_writer(out);
    for c in cells {
        writer
            .serialize(ScatterRow {
                num: c.id(),
                dist: c.dist,
                module: c.module,
            })
            .context("writing scatter row")?;
    }
    writer.flush().context("flushing scatter")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_everything_once() {
        let values = [0.0, 0.1, 0.2, 0.25, 0.5, 0.9, 1.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].count, 3);
        // the maximum lands in the last bin
        assert_eq!(bins[3].count, 2);
        assert_eq!(bins[3].bin_end, 1.0);
    }

    #[test]
    fn flat_values_make_one_bin() {
        let bins = histogram(&[0.3, 0.3, 0.3], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn empty_values_make_no_bins() {
        assert!(histogram(&[], 5).is_empty());
    }
}
