use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::model::ScoredCell;
use crate::state::SortState;

/// One row of `details.csv`. Field order is the column order.
#[derive(Debug, Serialize)]
struct DetailRow {
    num: i64,
    v0: String,
    st: String,
    lt: String,
    dev_st: String,
    dev_lt: String,
    dev: String,
    largest_dev: &'static str,
    dist: String,
    abs_dist: String,
    #[serde(rename = "mod")]
    module: u32,
}

fn fixed(value: f64) -> String {
    format!("{value:.6}")
}

impl From<&ScoredCell> for DetailRow {
    fn from(c: &ScoredCell) -> Self {
        DetailRow {
            num: c.id(),
            v0: fixed(c.record.v0),
            st: fixed(c.record.st),
            lt: fixed(c.record.lt),
            dev_st: fixed(c.dev_st),
            dev_lt: fixed(c.dev_lt),
            dev: fixed(c.dev),
            largest_dev: c.dominant.tag(),
            dist: fixed(c.dist),
            abs_dist: fixed(c.abs_dist),
            module: c.module,
        }
    }
}

/// Write the per-cell table, ordered by `dev`.
pub fn write_details<W: Write>(state: &SortState, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for cell in state.cells_by_dev() {
        writer
            .serialize(DetailRow::from(cell))
            .with_context(|| format!("writing details row for cell {}", cell.id()))?;
    }
    writer.flush().context("flushing details table")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortConfig;
    use crate::data::model::CellRecord;
    use crate::pipeline;

    #[test]
    fn header_and_row_shape() {
        let records: Vec<CellRecord> = (1..=14)
            .map(|id| CellRecord {
                id,
                v0: 3.5 + 0.01 * id as f64,
                st: 0.02 + 0.0001 * (id % 3) as f64,
                lt: 0.01 + 0.0002 * id as f64 + 0.00005 * (id % 2) as f64,
            })
            .collect();
        let state = pipeline::run(&records, &SortConfig::default()).unwrap();

        let mut buf = Vec::new();
        write_details(&state, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("num,v0,st,lt,dev_st,dev_lt,dev,largest_dev,dist,abs_dist,mod")
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 14);
        for row in rows {
            let fields: Vec<&str> = row.split(',').collect();
            assert_eq!(fields.len(), 11);
            assert!(fields[7] == "st" || fields[7] == "lt");
            assert!(fields[10].parse::<u32>().is_ok());
        }
    }
}
