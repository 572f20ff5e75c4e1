use thiserror::Error;

/// Result type for the sorting engine.
pub type Result<T> = std::result::Result<T, SortError>;

/// Failures raised by validation, scoring and bookkeeping.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SortError {
    /// The same cell was measured more than once.
    #[error(
        "duplicate cell number(s) found: {}\nThese cells must have been tested more than once. \
         Decide which result is valid and remove all others.",
        join_ids(.ids)
    )]
    DuplicateIds { ids: Vec<i64> },

    #[error("row {row}: cell number must be positive, got {id}")]
    InvalidId { row: usize, id: i64 },

    #[error("row {row}: cell {id} has a non-finite {field} reading")]
    NonFiniteReading {
        row: usize,
        id: i64,
        field: &'static str,
    },

    #[error("population is empty")]
    EmptyPopulation,

    /// Fewer than two distinct `v0` values: the regression slope is undefined.
    #[error("cannot fit lt against v0 over {count} cell(s): v0 has no spread")]
    DegenerateFit { count: usize },

    #[error("mean of {field} is zero; deviations are undefined")]
    ZeroMean { field: &'static str },

    #[error("predicted lt is zero for cell {id} (v0 = {v0})")]
    ZeroPrediction { id: i64, v0: f64 },

    /// Cells were lost or duplicated between stages. Always a bug.
    #[error("cell accounting violated: expected {expected} cells, found {actual}")]
    Accounting { expected: usize, actual: usize },

    /// A module ended up with the wrong number of members. Always a bug.
    #[error("module {module} has {members} cells, expected {width}")]
    MalformedModule {
        module: u32,
        members: usize,
        width: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
