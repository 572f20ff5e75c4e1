use log::{debug, info};

use super::deviation::{self, DeviationModel};
use super::model::ScoredCell;
use super::stats;
use crate::error::{Result, SortError};

// ---------------------------------------------------------------------------
// Outlier split
// ---------------------------------------------------------------------------

/// Result of splitting a scored population on its `dev_st` spread.
#[derive(Debug, Clone, Default)]
pub struct OutlierSplit {
    pub good: Vec<ScoredCell>,
    pub excluded: Vec<ScoredCell>,
    /// `mean(dev_st) + coefficient * stddev(dev_st)`.
    pub threshold: f64,
}

/// Split `cells` at `mean(dev_st) + coefficient * stddev(dev_st)`.
///
/// A cell whose `dev_st` is at or above the threshold is excluded. Input
/// order is kept within each side.
pub fn partition_outliers(cells: Vec<ScoredCell>, coefficient: f64) -> Result<OutlierSplit> {
    let dev_st: Vec<f64> = cells.iter().map(|c| c.dev_st).collect();
    let (Some(mu), Some(sigma)) = (stats::mean(&dev_st), stats::pop_std_dev(&dev_st)) else {
        return Err(SortError::EmptyPopulation);
    };
    let threshold = mu + coefficient * sigma;

    let (excluded, good): (Vec<_>, Vec<_>) =
        cells.into_iter().partition(|c| c.dev_st >= threshold);

    debug!(
        "dev_st mean {mu:.6}, stddev {sigma:.6}, threshold {threshold:.6}: {} good, {} excluded",
        good.len(),
        excluded.len()
    );
    Ok(OutlierSplit {
        good,
        excluded,
        threshold,
    })
}

// ---------------------------------------------------------------------------
// Divisibility trim
// ---------------------------------------------------------------------------

/// Move the cells of `good` farthest from its median `lt` into `excluded`
/// until `good.len()` is a multiple of `width`.
///
/// `abs_dist` must already be measured against `good`'s own median. Ties
/// move the larger id first. Returns the ids moved, in removal order.
pub fn trim_to_modules(
    good: &mut Vec<ScoredCell>,
    excluded: &mut Vec<ScoredCell>,
    width: usize,
) -> Vec<i64> {
    let surplus = good.len() % width;
    let mut moved = Vec::with_capacity(surplus);

    for _ in 0..surplus {
        let Some(idx) = good
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.abs_dist
                    .total_cmp(&b.abs_dist)
                    .then_with(|| a.id().cmp(&b.id()))
            })
            .map(|(i, _)| i)
        else {
            break;
        };
        let cell = good.remove(idx);
        moved.push(cell.id());
        excluded.push(cell);
    }
    moved
}

// ---------------------------------------------------------------------------
// Full filter stage
// ---------------------------------------------------------------------------

/// Output of the filter stage.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub good: Vec<ScoredCell>,
    pub excluded: Vec<ScoredCell>,
    pub threshold: f64,
    /// Ids over the threshold.
    pub outliers: Vec<i64>,
    /// Ids moved out of `good` by the divisibility trim.
    pub trimmed: Vec<i64>,
}

/// Split a fully scored population, rescore each side on its own terms and
/// trim `good` to a multiple of `width`.
pub fn filter(
    cells: Vec<ScoredCell>,
    model: &DeviationModel,
    coefficient: f64,
    width: usize,
) -> Result<FilterOutcome> {
    let OutlierSplit {
        mut good,
        mut excluded,
        threshold,
    } = partition_outliers(cells, coefficient)?;
    let outliers: Vec<i64> = excluded.iter().map(ScoredCell::id).collect();

    deviation::rescore(&mut good, model, "good")?;
    let trimmed = trim_to_modules(&mut good, &mut excluded, width);
    if !trimmed.is_empty() {
        deviation::rescore(&mut good, model, "good")?;
    }
    deviation::rescore(&mut excluded, model, "excluded")?;

    info!(
        "outlier filter: {} good, {} over threshold {threshold:.6}, {} trimmed",
        good.len(),
        outliers.len(),
        trimmed.len()
    );
    Ok(FilterOutcome {
        good,
        excluded,
        threshold,
        outliers,
        trimmed,
    })
}
