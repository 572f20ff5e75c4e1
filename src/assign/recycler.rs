use log::info;

use super::assigner::{assign_modules, Assignment};
use crate::data::deviation;
use crate::data::model::ScoredCell;

/// Cells that went through the recycling pass.
#[derive(Debug, Clone)]
pub struct Recycled {
    /// Cells packed into a recycled module.
    pub packed: Vec<ScoredCell>,
    /// Cells left over after every pass.
    pub leftover: Vec<ScoredCell>,
    pub assignment: Assignment,
}

/// Pool the first pass's unassigned cells with the excluded population and
/// pack a second round of modules numbered from `first_module`.
///
/// The pool is measured against its own median `lt` before packing.
pub fn recycle(
    unused: Vec<ScoredCell>,
    excluded: Vec<ScoredCell>,
    width: usize,
    first_module: u32,
) -> Recycled {
    let mut pool = unused;
    pool.extend(excluded);
    deviation::apply_distance(&mut pool);

    let assignment = assign_modules(&mut pool, width, first_module);
    let (packed, leftover): (Vec<_>, Vec<_>) = pool.into_iter().partition(ScoredCell::is_assigned);

    info!(
        "recycling pass: {} modules from {} pooled cells, {} left over",
        assignment.carved,
        packed.len() + leftover.len(),
        leftover.len()
    );
    Recycled {
        packed,
        leftover,
        assignment,
    }
}
