use std::collections::{BTreeMap, BTreeSet};

use crate::data::deviation::DeviationModel;
use crate::data::model::{Placement, ScoredCell};
use crate::error::{Result, SortError};

// ---------------------------------------------------------------------------
// Sort state
// ---------------------------------------------------------------------------

/// The finished sort, independent of how it is reported.
#[derive(Debug, Clone)]
pub struct SortState {
    /// Every input cell exactly once, in final scored form.
    pub cells: Vec<ScoredCell>,

    /// Final placement of each cell id.
    pub placement: BTreeMap<i64, Placement>,

    /// Model fitted over the whole input batch.
    pub model: DeviationModel,

    /// `dev_st` cut used by the outlier filter.
    pub threshold: f64,

    /// Ids at or above the threshold.
    pub outliers: Vec<i64>,

    /// Ids moved out of the good population to make it divisible.
    pub trimmed: Vec<i64>,

    /// Modules carved by the first pass (numbered from 1).
    pub first_pass_modules: u32,

    /// Modules carved by the recycling pass (numbered after the first pass).
    pub recycled_modules: u32,

    /// Cells per module.
    pub width: usize,
}

impl SortState {
    /// Number of cells tracked.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is tracked.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total modules over both passes.
    pub fn module_count(&self) -> u32 {
        self.first_pass_modules + self.recycled_modules
    }

    /// Module number → sorted member ids, in increasing module order.
    pub fn roster(&self) -> BTreeMap<u32, Vec<i64>> {
        let mut roster: BTreeMap<u32, Vec<i64>> = BTreeMap::new();
        for cell in self.cells.iter().filter(|c| c.is_assigned()) {
            roster.entry(cell.module).or_default().push(cell.id());
        }
        for ids in roster.values_mut() {
            ids.sort_unstable();
        }
        roster
    }

    /// Sorted ids of cells with no module.
    pub fn leftover_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .cells
            .iter()
            .filter(|c| !c.is_assigned())
            .map(ScoredCell::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Every id (sorted) with its module, `None` when unassigned.
    pub fn lookup(&self) -> BTreeMap<i64, Option<u32>> {
        self.cells
            .iter()
            .map(|c| (c.id(), c.is_assigned().then_some(c.module)))
            .collect()
    }

    /// Module of one cell; `None` if unassigned or unknown.
    pub fn module_of(&self, id: i64) -> Option<u32> {
        self.cells
            .iter()
            .find(|c| c.id() == id)
            .filter(|c| c.is_assigned())
            .map(|c| c.module)
    }

    pub fn placement_of(&self, id: i64) -> Option<Placement> {
        self.placement.get(&id).copied()
    }

    /// How many cells ended in `placement`.
    pub fn count(&self, placement: Placement) -> usize {
        self.placement.values().filter(|&&p| p == placement).count()
    }

    /// Cells in report order: ascending `dev`, ties by id.
    pub fn cells_by_dev(&self) -> Vec<&ScoredCell> {
        let mut cells: Vec<&ScoredCell> = self.cells.iter().collect();
        cells.sort_by(|a, b| a.dev.total_cmp(&b.dev).then_with(|| a.id().cmp(&b.id())));
        cells
    }

    /// Every input cell is tracked exactly once and every placement agrees
    /// with the module stamp.
    pub fn check_conservation(&self, expected: usize) -> Result<()> {
        let unique: BTreeSet<i64> = self.cells.iter().map(ScoredCell::id).collect();
        let placed = self.count(Placement::FirstPass)
            + self.count(Placement::Recycled)
            + self.count(Placement::Leftover);

        for actual in [self.cells.len(), unique.len(), self.placement.len(), placed] {
            if actual != expected {
                return Err(SortError::Accounting { expected, actual });
            }
        }

        let stamped_leftover = self.cells.iter().filter(|c| !c.is_assigned()).count();
        if stamped_leftover != self.count(Placement::Leftover) {
            return Err(SortError::Accounting {
                expected: self.count(Placement::Leftover),
                actual: stamped_leftover,
            });
        }
        Ok(())
    }

    /// Every module has exactly `width` members and numbers run 1..=count
    /// without gaps.
    pub fn check_module_sizes(&self) -> Result<()> {
        let roster = self.roster();
        for module in 1..=self.module_count() {
            let members = roster.get(&module).map_or(0, Vec::len);
            if members != self.width {
                return Err(SortError::MalformedModule {
                    module,
                    members,
                    width: self.width,
                });
            }
        }
        if let Some((&module, ids)) = roster.range(self.module_count() + 1..).next() {
            return Err(SortError::MalformedModule {
                module,
                members: ids.len(),
                width: self.width,
            });
        }
        Ok(())
    }
}
