//! Loader output → analyzer → filter → assigner → recycler.

use std::collections::BTreeMap;

use log::info;

use crate::assign::assigner::assign_modules;
use crate::assign::recycler::recycle;
use crate::config::SortConfig;
use crate::data::deviation;
use crate::data::filter::{self, FilterOutcome};
use crate::data::model::{CellRecord, Placement, ScoredCell};
use crate::error::Result;
use crate::state::SortState;

/// Sort a validated batch into modules.
///
/// Either every stage succeeds and the returned state satisfies the
/// conservation and module-size checks, or nothing is returned.
pub fn run(records: &[CellRecord], config: &SortConfig) -> Result<SortState> {
    config.validate()?;
    let width = config.cells_per_module;

    let mut scored: Vec<ScoredCell> = records.iter().copied().map(ScoredCell::unscored).collect();
    let model = deviation::analyze(&mut scored)?;
    info!(
        "fit over {} cells: lt = {:.6} + {:.6}*v0, mean st = {:.6}",
        scored.len(),
        model.intercept,
        model.slope,
        model.mean_st
    );

    let FilterOutcome {
        mut good,
        excluded,
        threshold,
        outliers,
        trimmed,
    } = filter::filter(scored, &model, config.outlier_coefficient, width)?;

    let first = assign_modules(&mut good, width, 1);
    let (packed, unused): (Vec<_>, Vec<_>) = good.into_iter().partition(ScoredCell::is_assigned);
    info!(
        "first pass: {} modules, {} cells unused",
        first.carved,
        unused.len()
    );

    let second = recycle(unused, excluded, width, first.next_module());

    let mut placement = BTreeMap::new();
    let mut cells = Vec::with_capacity(records.len());
    for (group, kind) in [
        (packed, Placement::FirstPass),
        (second.packed, Placement::Recycled),
        (second.leftover, Placement::Leftover),
    ] {
        for cell in group {
            placement.insert(cell.id(), kind);
            cells.push(cell);
        }
    }

    let state = SortState {
        cells,
        placement,
        model,
        threshold,
        outliers,
        trimmed,
        first_pass_modules: first.carved,
        recycled_modules: second.assignment.carved,
        width,
    };
    state.check_conservation(records.len())?;
    state.check_module_sizes()?;

    info!(
        "{} modules ({} first pass, {} recycled), {} cells left over",
        state.module_count(),
        state.first_pass_modules,
        state.recycled_modules,
        state.count(Placement::Leftover)
    );
    Ok(state)
}
