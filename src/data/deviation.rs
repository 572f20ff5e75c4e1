use log::{debug, warn};
use serde::Serialize;

use super::model::{Dominant, ScoredCell};
use super::stats::{self, LinearFit};
use crate::error::{Result, SortError};

// ---------------------------------------------------------------------------
// DeviationModel – expected values for st and lt
// ---------------------------------------------------------------------------

/// Expected-value model of a population: mean `st` and the `lt`-vs-`v0` line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviationModel {
    pub intercept: f64,
    pub slope: f64,
    pub mean_st: f64,
}

impl DeviationModel {
    /// Fit the model over a population.
    pub fn fit(cells: &[ScoredCell]) -> Result<Self> {
        if cells.is_empty() {
            return Err(SortError::EmptyPopulation);
        }
        let v0: Vec<f64> = cells.iter().map(|c| c.record.v0).collect();
        let lt: Vec<f64> = cells.iter().map(|c| c.record.lt).collect();
        let st: Vec<f64> = cells.iter().map(|c| c.record.st).collect();

        let line = LinearFit::fit(&v0, &lt)?;
        let mean_st = stats::mean(&st).ok_or(SortError::EmptyPopulation)?;
        if mean_st == 0.0 {
            return Err(SortError::ZeroMean { field: "st" });
        }

        Ok(DeviationModel {
            intercept: line.intercept,
            slope: line.slope,
            mean_st,
        })
    }

    /// The `lt`-vs-`v0` line.
    pub fn line(&self) -> LinearFit {
        LinearFit {
            intercept: self.intercept,
            slope: self.slope,
        }
    }

    pub fn predict_lt(&self, v0: f64) -> f64 {
        self.line().predict(v0)
    }

    /// Write `dev_st`, `dev_lt`, `dev` and `dominant` for every cell.
    ///
    /// Nothing is written unless every prediction is non-zero.
    pub fn score(&self, cells: &mut [ScoredCell]) -> Result<()> {
        if let Some(cell) = cells.iter().find(|c| self.predict_lt(c.record.v0) == 0.0) {
            return Err(SortError::ZeroPrediction {
                id: cell.id(),
                v0: cell.record.v0,
            });
        }

        for cell in cells.iter_mut() {
            let lt_pred = self.predict_lt(cell.record.v0);
            cell.dev_lt = (cell.record.lt - lt_pred).abs() / lt_pred;
            cell.dev_st = (cell.record.st - self.mean_st).abs() / self.mean_st;
            cell.dev = cell.dev_st.max(cell.dev_lt);
            cell.dominant = if cell.dev_st > cell.dev_lt {
                Dominant::St
            } else {
                Dominant::Lt
            };
        }
        Ok(())
    }
}

/// Fit and score a population on its own terms.
pub fn analyze(cells: &mut [ScoredCell]) -> Result<DeviationModel> {
    let model = DeviationModel::fit(cells)?;
    model.score(cells)?;
    apply_distance(cells);
    debug!(
        "scored {} cells: lt = {:.6} + {:.6}*v0, mean st = {:.6}",
        cells.len(),
        model.intercept,
        model.slope,
        model.mean_st
    );
    Ok(model)
}

/// Score a sub-population with its own model, or with `parent` when its own
/// fit is degenerate.
pub fn rescore(cells: &mut [ScoredCell], parent: &DeviationModel, label: &str) -> Result<()> {
    if cells.is_empty() {
        return Ok(());
    }
    match analyze(cells) {
        Ok(_) => Ok(()),
        Err(
            err @ (SortError::DegenerateFit { .. }
            | SortError::ZeroMean { .. }
            | SortError::ZeroPrediction { .. }),
        ) => {
            warn!("{label} population: {err}; scoring with the full-batch model");
            parent.score(cells)?;
            apply_distance(cells);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Set `dist` and `abs_dist` against the population's median `lt`.
pub fn apply_distance(cells: &mut [ScoredCell]) {
    let lt: Vec<f64> = cells.iter().map(|c| c.record.lt).collect();
    let Some(median_lt) = stats::median(&lt) else {
        return;
    };
    for cell in cells.iter_mut() {
        cell.dist = cell.record.lt - median_lt;
        cell.abs_dist = cell.dist.abs();
    }
}
