//! Population statistics used by the analyzer and the filter.

use crate::error::{Result, SortError};

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn pop_std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let delta = v - mu;
            delta * delta
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

/// Median; the mean of the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// LinearFit – ordinary least squares, first degree
// ---------------------------------------------------------------------------

/// `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Ordinary least squares over paired samples.
    ///
    /// Fails when `x` has no spread (fewer than two points, or all equal),
    /// since the slope is then undefined.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        debug_assert_eq!(x.len(), y.len());
        let (Some(x_mean), Some(y_mean)) = (mean(x), mean(y)) else {
            return Err(SortError::EmptyPopulation);
        };

        if x.iter().all(|&v| v == x[0]) {
            return Err(SortError::DegenerateFit { count: x.len() });
        }

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - x_mean;
            sxx += dx * dx;
            sxy += dx * (yi - y_mean);
        }
        if sxx == 0.0 || !sxx.is_finite() {
            return Err(SortError::DegenerateFit { count: x.len() });
        }

        let slope = sxy / sxx;
        Ok(LinearFit {
            intercept: y_mean - slope * x_mean,
            slope,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_population_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        assert_eq!(pop_std_dev(&v), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn fit_recovers_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 + 2.0 * v).collect();
        let fit = LinearFit::fit(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 0.5).abs() < 1e-12);
        assert!((fit.predict(10.0) - 20.5).abs() < 1e-12);
    }

    #[test]
    fn fit_rejects_constant_x() {
        // 3.6 does not average back to itself exactly for most counts
        for n in [3, 10, 24, 36] {
            let x = vec![3.6; n];
            let y: Vec<f64> = (0..n).map(|i| 0.01 + 0.001 * i as f64).collect();
            assert_eq!(
                LinearFit::fit(&x, &y).unwrap_err(),
                SortError::DegenerateFit { count: n },
                "n={n}"
            );
        }
    }

    #[test]
    fn fit_rejects_single_point() {
        assert!(matches!(
            LinearFit::fit(&[3.6], &[1.0]),
            Err(SortError::DegenerateFit { count: 1 })
        ));
    }
}
