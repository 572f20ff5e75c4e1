/// Report writers. Called only once the whole pipeline has succeeded.
///
/// ```text
///   SortState ──► details.csv           per-cell table
///             ├─► module_list.txt       roster + leftover
///             ├─► cell_list.txt         id → module lookup
///             ├─► dev_st_histogram.csv  } plot data
///             ├─► dist_vs_module.csv    }
///             └─► summary.json
/// ```

pub mod plot;
pub mod roster;
pub mod tables;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::config::SortConfig;
use crate::data::deviation::DeviationModel;
use crate::data::model::Placement;
use crate::state::SortState;

pub const DETAILS_FILE: &str = "details.csv";
pub const ROSTER_FILE: &str = "module_list.txt";
pub const LOOKUP_FILE: &str = "cell_list.txt";
pub const HISTOGRAM_FILE: &str = "dev_st_histogram.csv";
pub const SCATTER_FILE: &str = "dist_vs_module.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Run-level numbers for `summary.json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub cells: usize,
    pub cells_per_module: usize,
    pub outlier_coefficient: f64,
    pub threshold: f64,
    pub model: DeviationModel,
    pub outliers: Vec<i64>,
    pub trimmed: Vec<i64>,
    pub first_pass_modules: u32,
    pub recycled_modules: u32,
    pub first_pass_cells: usize,
    pub recycled_cells: usize,
    pub leftover: Vec<i64>,
}

impl Summary {
    pub fn new(state: &SortState, config: &SortConfig) -> Self {
        Summary {
            cells: state.len(),
            cells_per_module: state.width,
            outlier_coefficient: config.outlier_coefficient,
            threshold: state.threshold,
            model: state.model,
            outliers: state.outliers.clone(),
            trimmed: state.trimmed.clone(),
            first_pass_modules: state.first_pass_modules,
            recycled_modules: state.recycled_modules,
            first_pass_cells: state.count(Placement::FirstPass),
            recycled_cells: state.count(Placement::Recycled),
            leftover: state.leftover_ids(),
        }
    }
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    Ok((path, BufWriter::new(file)))
}

/// Write every report into `dir` (created if missing). Returns the paths.
pub fn write_all(state: &SortState, config: &SortConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let mut written = Vec::new();

    let (path, out) = create(dir, DETAILS_FILE)?;
    tables::write_details(state, out)?;
    written.push(path);

    for (name, text) in [
        (ROSTER_FILE, roster::render_roster(state)),
        (LOOKUP_FILE, roster::render_lookup(state)),
    ] {
        let path = dir.join(name);
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    let (path, out) = create(dir, HISTOGRAM_FILE)?;
    plot::write_dev_st_histogram(state, config.histogram_bins, out)?;
    written.push(path);

    let (path, out) = create(dir, SCATTER_FILE)?;
    plot::write_dist_scatter(state, out)?;
    written.push(path);

    let (path, mut out) = create(dir, SUMMARY_FILE)?;
    serde_json::to_writer_pretty(&mut out, &Summary::new(state, config))
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    written.push(path);

    info!("wrote {} reports to {}", written.len(), dir.display());
    Ok(written)
}
