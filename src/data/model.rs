use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawRow – one measurement row as delivered by the test bench
// ---------------------------------------------------------------------------

/// A row of the measurement table: `num, v0, res_st, res_lt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub num: i64,
    pub v0: f64,
    pub res_st: f64,
    pub res_lt: f64,
}

// ---------------------------------------------------------------------------
// CellRecord – a validated cell
// ---------------------------------------------------------------------------

/// A validated cell measurement. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRecord {
    /// Cell number, unique across the batch.
    pub id: i64,
    /// Initial voltage.
    pub v0: f64,
    /// Short-term (pulse) resistance.
    pub st: f64,
    /// Long-term resistance in excess of `st`.
    pub lt: f64,
}

impl From<RawRow> for CellRecord {
    fn from(row: RawRow) -> Self {
        CellRecord {
            id: row.num,
            v0: row.v0,
            st: row.res_st,
            lt: row.res_lt - row.res_st,
        }
    }
}

// ---------------------------------------------------------------------------
// Dominant – which deviation is larger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dominant {
    St,
    #[default]
    Lt,
}

impl Dominant {
    /// Two-character tag used in reports.
    pub fn tag(self) -> &'static str {
        match self {
            Dominant::St => "st",
            Dominant::Lt => "lt",
        }
    }
}

impl fmt::Display for Dominant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// ScoredCell – a cell with its derived metrics
// ---------------------------------------------------------------------------

/// A cell enriched with deviation metrics and its module stamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCell {
    pub record: CellRecord,
    pub dev_st: f64,
    pub dev_lt: f64,
    /// `max(dev_st, dev_lt)`.
    pub dev: f64,
    pub dominant: Dominant,
    /// Signed distance of `lt` from the population median.
    pub dist: f64,
    pub abs_dist: f64,
    /// 0 while unassigned.
    pub module: u32,
}

impl ScoredCell {
    /// A cell with no metrics computed yet.
    pub fn unscored(record: CellRecord) -> Self {
        ScoredCell {
            record,
            dev_st: 0.0,
            dev_lt: 0.0,
            dev: 0.0,
            dominant: Dominant::default(),
            dist: 0.0,
            abs_dist: 0.0,
            module: 0,
        }
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }

    pub fn is_assigned(&self) -> bool {
        self.module != 0
    }
}

// ---------------------------------------------------------------------------
// Placement – where a cell ended up
// ---------------------------------------------------------------------------

/// Where a cell ended up once every pass has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placement {
    /// Packed by the first pass over the good population.
    FirstPass,
    /// Packed by the recycling pass.
    Recycled,
    /// Left over after every pass.
    Leftover,
}
