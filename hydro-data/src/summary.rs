//! Descriptive statistics of a daily discharge series.

use hydro_usgs::{DailySeries, MissingCount};
use serde::Serialize;

/// Statistics of the present discharge values in a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DischargeSummary {
    pub count: usize,
    pub missing: MissingCount,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `NaN` for a single value.
    pub std_dev: f64,
}

impl DischargeSummary {
    /// Compute statistics over the present values. Returns `None` when the
    /// series has no present discharge at all.
    pub fn compute(series: &DailySeries) -> Option<Self> {
        let mut vals: Vec<f64> = series.iter().filter_map(|obs| obs.discharge).collect();
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = vals.iter().sum::<f64>() / count as f64;

        vals.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };

        let std_dev = if count > 1 {
            let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            f64::NAN
        };

        Some(DischargeSummary {
            count,
            missing: series.missing_count(),
            min,
            max,
            mean,
            median,
            std_dev,
        })
    }
}
