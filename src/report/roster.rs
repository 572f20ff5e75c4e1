use crate::state::SortState;

fn join(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Module N: id, id, ...` per module, then the leftover line.
pub fn render_roster(state: &SortState) -> String {
    let mut out = String::new();
    for (module, ids) in state.roster() {
        out.push_str(&format!("Module {module}: {}\n", join(&ids)));
    }
    let leftover = state.leftover_ids();
    if leftover.is_empty() {
        out.push_str("Leftover: none\n");
    } else {
        out.push_str(&format!("Leftover: {}\n", join(&leftover)));
    }
    out
}

/// `Cell ID: module N` per cell, sorted by id.
pub fn render_lookup(state: &SortState) -> String {
    let mut out = String::new();
    for (id, module) in state.lookup() {
        let module = module.map_or_else(|| "none".to_string(), |m| m.to_string());
        out.push_str(&format!("Cell {id}: module {module}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::deviation::DeviationModel;
    use crate::data::model::{CellRecord, Placement, ScoredCell};

    fn state() -> SortState {
        let mut cells = Vec::new();
        let mut placement = BTreeMap::new();
        for (id, module) in [(5, 1), (2, 1), (9, 0), (4, 2), (1, 2), (7, 0)] {
            let mut c = ScoredCell::unscored(CellRecord {
                id,
                v0: 3.6,
                st: 0.02,
                lt: 0.01,
            });
            c.module = module;
            let kind = match module {
                0 => Placement::Leftover,
                1 => Placement::FirstPass,
                _ => Placement::Recycled,
            };
            placement.insert(id, kind);
            cells.push(c);
        }
        SortState {
            cells,
            placement,
            model: DeviationModel {
                intercept: 0.0,
                slope: 0.0,
                mean_st: 0.02,
            },
            threshold: 0.0,
            outliers: Vec::new(),
            trimmed: Vec::new(),
            first_pass_modules: 1,
            recycled_modules: 1,
            width: 2,
        }
    }

    #[test]
    fn roster_lists_modules_then_leftover() {
        assert_eq!(
            render_roster(&state()),
            "Module 1: 2, 5\nModule 2: 1, 4\nLeftover: 7, 9\n"
        );
    }

    #[test]
    fn lookup_marks_unassigned_cells() {
        let text = render_lookup(&state());
        assert_eq!(
            text,
            "Cell 1: module 2\nCell 2: module 1\nCell 4: module 2\n\
             Cell 5: module 1\nCell 7: module none\nCell 9: module none\n"
        );
    }

    #[test]
    fn roster_without_leftover_says_none() {
        let mut s = state();
        s.cells.retain(|c| c.module != 0);
        s.placement.retain(|_, kind| *kind != Placement::Leftover);
        let text = render_roster(&s);
        assert!(text.ends_with("Leftover: none\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn hand_built_state_passes_checks() {
        let s = state();
        s.check_conservation(6).unwrap();
        s.check_module_sizes().unwrap();
        assert!(s.check_conservation(7).is_err());
    }
}
