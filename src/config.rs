//! Sorting configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SortError;

/// Default number of cells in one module.
pub const DEFAULT_CELLS_PER_MODULE: usize = 12;

/// Default multiple of `stddev(dev_st)` added to the mean for the outlier cut.
pub const DEFAULT_OUTLIER_COEFFICIENT: f64 = 0.5;

/// Default number of bins in the `dev_st` histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Knobs of the sorting run, passed explicitly to the filter and assigner.
///
/// ```toml
/// cells_per_module = 12
/// outlier_coefficient = 0.5
/// histogram_bins = 20
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    pub cells_per_module: usize,
    pub outlier_coefficient: f64,
    pub histogram_bins: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            cells_per_module: DEFAULT_CELLS_PER_MODULE,
            outlier_coefficient: DEFAULT_OUTLIER_COEFFICIENT,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl SortConfig {
    /// Read a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: SortConfig =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), SortError> {
        if self.cells_per_module == 0 {
            return Err(SortError::InvalidConfig(
                "cells_per_module must be at least 1".into(),
            ));
        }
        if !self.outlier_coefficient.is_finite() || self.outlier_coefficient < 0.0 {
            return Err(SortError::InvalidConfig(format!(
                "outlier_coefficient must be a finite non-negative number, got {}",
                self.outlier_coefficient
            )));
        }
        if self.histogram_bins == 0 {
            return Err(SortError::InvalidConfig(
                "histogram_bins must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_module_layout() {
        let config = SortConfig::default();
        assert_eq!(config.cells_per_module, 12);
        assert_eq!(config.outlier_coefficient, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cells_per_module = 8").unwrap();
        let config = SortConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.cells_per_module, 8);
        assert_eq!(config.histogram_bins, DEFAULT_HISTOGRAM_BINS);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "modules = 35").unwrap();
        assert!(SortConfig::from_toml_file(file.path()).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_width = SortConfig {
            cells_per_module: 0,
            ..SortConfig::default()
        };
        assert!(matches!(
            zero_width.validate(),
            Err(SortError::InvalidConfig(_))
        ));

        let negative = SortConfig {
            outlier_coefficient: -1.0,
            ..SortConfig::default()
        };
        assert!(negative.validate().is_err());
    }
}
