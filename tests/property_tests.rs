//! Property-based tests for the sorting pipeline.
//!
//! - Cell accounting is conserved
//! - Every module is full
//! - Runs are deterministic
//! - The outlier cut is exact
//! - Roster and lookup reports agree

use std::collections::BTreeMap;

use cell_matcher::data::deviation;
use cell_matcher::data::filter::partition_outliers;
use cell_matcher::data::model::{CellRecord, ScoredCell};
use cell_matcher::data::stats;
use cell_matcher::report::roster::{render_lookup, render_roster};
use cell_matcher::{pipeline, SortConfig};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Batch of `2..max` cells with strictly increasing `v0` and plausible
/// resistances; a few cells may carry an inflated `st`.
fn arb_batch(max: usize) -> impl Strategy<Value = Vec<CellRecord>> {
    proptest::collection::vec(
        (0.0f64..0.0009, 0.015f64..0.030, 0.004f64..0.020, prop::bool::weighted(0.05)),
        2..max,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (jitter, st, lt, inflated))| CellRecord {
                id: i as i64 + 1,
                v0: 3.5 + 0.001 * i as f64 + jitter,
                st: if inflated { st * 10.0 } else { st },
                lt,
            })
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = SortConfig> {
    (2usize..=12, 0.0f64..1.5).prop_map(|(cells_per_module, outlier_coefficient)| SortConfig {
        cells_per_module,
        outlier_coefficient,
        ..SortConfig::default()
    })
}

/// `Module N: a, b` / `Cell ID: module N` text back into id → module.
fn parse_roster(text: &str) -> BTreeMap<i64, Option<u32>> {
    let mut out = BTreeMap::new();
    for line in text.lines() {
        let (head, ids) = line.split_once(": ").unwrap();
        let module = head.strip_prefix("Module ").map(|m| m.parse::<u32>().unwrap());
        if ids == "none" {
            continue;
        }
        for id in ids.split(", ") {
            out.insert(id.parse().unwrap(), module);
        }
    }
    out
}

fn parse_lookup(text: &str) -> BTreeMap<i64, Option<u32>> {
    text.lines()
        .map(|line| {
            let rest = line.strip_prefix("Cell ").unwrap();
            let (id, module) = rest.split_once(": module ").unwrap();
            (id.parse().unwrap(), module.parse().ok())
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every input cell is placed exactly once
    #[test]
    fn prop_cells_are_conserved(batch in arb_batch(120), config in arb_config()) {
        let state = pipeline::run(&batch, &config).unwrap();
        prop_assert_eq!(state.len(), batch.len());
        prop_assert!(state.check_conservation(batch.len()).is_ok());

        let modules: usize = state.roster().values().map(Vec::len).sum();
        prop_assert_eq!(modules + state.leftover_ids().len(), batch.len());
    }

    /// Property: all modules are full and as many as the batch allows
    #[test]
    fn prop_modules_are_full(batch in arb_batch(120), config in arb_config()) {
        let state = pipeline::run(&batch, &config).unwrap();
        let width = config.cells_per_module;
        for ids in state.roster().values() {
            prop_assert_eq!(ids.len(), width);
        }
        prop_assert_eq!(state.module_count() as usize, batch.len() / width);
        prop_assert!(state.leftover_ids().len() < width);
    }

    /// Property: first-pass numbers are below recycled numbers
    #[test]
    fn prop_recycled_numbers_follow_first_pass(batch in arb_batch(120)) {
        let state = pipeline::run(&batch, &SortConfig::default()).unwrap();
        let roster = state.roster();
        let expected: Vec<u32> = (1..=state.module_count()).collect();
        prop_assert_eq!(roster.keys().copied().collect::<Vec<_>>(), expected);
    }

    /// Property: same input, same assignment
    #[test]
    fn prop_deterministic(batch in arb_batch(100), config in arb_config()) {
        let a = pipeline::run(&batch, &config).unwrap();
        let b = pipeline::run(&batch, &config).unwrap();
        prop_assert_eq!(a.lookup(), b.lookup());
    }

    /// Property: excluded == { dev_st >= mean + k * stddev }
    #[test]
    fn prop_outlier_cut_is_exact(batch in arb_batch(120), k in 0.0f64..2.0) {
        let mut cells: Vec<ScoredCell> = batch.iter().copied().map(ScoredCell::unscored).collect();
        deviation::analyze(&mut cells).unwrap();

        let dev_st: Vec<f64> = cells.iter().map(|c| c.dev_st).collect();
        let threshold = stats::mean(&dev_st).unwrap() + k * stats::pop_std_dev(&dev_st).unwrap();
        let mut expected: Vec<i64> = cells.iter().filter(|c| c.dev_st >= threshold).map(|c| c.id()).collect();

        let split = partition_outliers(cells, k).unwrap();
        let mut excluded: Vec<i64> = split.excluded.iter().map(|c| c.id()).collect();
        expected.sort_unstable();
        excluded.sort_unstable();
        prop_assert_eq!(excluded, expected);
        prop_assert_eq!(split.threshold, threshold);
    }

    /// Property: roster and lookup reports agree for every id
    #[test]
    fn prop_reports_agree(batch in arb_batch(120)) {
        let state = pipeline::run(&batch, &SortConfig::default()).unwrap();
        let from_roster = parse_roster(&render_roster(&state));
        let from_lookup = parse_lookup(&render_lookup(&state));

        prop_assert_eq!(from_lookup.len(), batch.len());
        for (id, module) in &from_lookup {
            match module {
                Some(_) => prop_assert_eq!(from_roster.get(id), Some(module)),
                // leftover ids are listed under "Leftover", which parses to None
                None => prop_assert_eq!(from_roster.get(id), Some(&None)),
            }
        }
    }
}
