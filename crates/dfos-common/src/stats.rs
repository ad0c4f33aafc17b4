//! Summary statistics printed on charts and reports.

use serde::{Deserialize, Serialize};

/// Min, max, mean and population standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

impl SummaryStats {
    /// Compute over `values`. `None` for an empty slice.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let mean = sum / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min,
            max,
            mean,
            std: variance.sqrt(),
        })
    }

    /// Four-line text block, e.g. `Min: 17.00 °C`.
    pub fn lines(&self, unit: &str) -> [String; 4] {
        let suffix = if unit.is_empty() {
            String::new()
        } else {
            format!(" {}", unit)
        };
        [
            format!("Min: {:.2}{}", self.min, suffix),
            format!("Max: {:.2}{}", self.max, suffix),
            format!("Mean: {:.2}{}", self.mean, suffix),
            format!("Std: {:.2}{}", self.std, suffix),
        ]
    }
}

/// Statistics of `second - first` for two equally sized series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferenceStats {
    /// Largest absolute difference.
    pub max_abs: f64,
    pub mean: f64,
}

impl DifferenceStats {
    pub fn compute(differences: &[f64]) -> Option<Self> {
        if differences.is_empty() {
            return None;
        }
        let max_abs = differences.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
        let mean = differences.iter().sum::<f64>() / differences.len() as f64;
        Some(Self { max_abs, mean })
    }
}

/// Elementwise `second - first`. `None` when lengths differ.
pub fn difference(first: &[f64], second: &[f64]) -> Option<Vec<f64>> {
    (first.len() == second.len())
        .then(|| first.iter().zip(second).map(|(a, b)| b - a).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_basic() {
        let stats = SummaryStats::compute(&[17.0, 18.0, 19.0, 20.0, 21.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 17.0);
        assert_eq!(stats.max, 21.0);
        assert_eq!(stats.mean, 19.0);
        assert!((stats.std - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_compute_empty() {
        assert!(SummaryStats::compute(&[]).is_none());
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let stats = SummaryStats::compute(&[4.2]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, stats.max);
    }

    #[test]
    fn test_lines_format() {
        let stats = SummaryStats::compute(&[1.0, 3.0]).unwrap();
        let lines = stats.lines("GHz");
        assert_eq!(lines[0], "Min: 1.00 GHz");
        assert_eq!(lines[3], "Std: 1.00 GHz");
        assert_eq!(stats.lines("")[2], "Mean: 2.00");
    }

    #[test]
    fn test_difference() {
        let diff = difference(&[1.0, 2.0, 3.0], &[2.0, 0.0, 3.5]).unwrap();
        assert_eq!(diff, vec![1.0, -2.0, 0.5]);
        let stats = DifferenceStats::compute(&diff).unwrap();
        assert_eq!(stats.max_abs, 2.0);
        assert!((stats.mean - (-0.5 / 3.0)).abs() < 1e-12);
        assert!(difference(&[1.0], &[1.0, 2.0]).is_none());
    }
}
