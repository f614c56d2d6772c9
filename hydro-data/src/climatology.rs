//! Long-run monthly averages in water-year order.

use chrono::Datelike;
use hydro_usgs::metrics::MEAN_FLOW;
use hydro_usgs::{MetricsTable, Result};
use hydro_utils::water_year::{month_at_position, position_label, position_of_month};
use log::debug;
use serde::Serialize;

/// Metric averaged when the caller does not name one.
pub const DEFAULT_METRIC: &str = MEAN_FLOW;

/// Mean of one metric for each calendar month, indexed by water-year
/// position: 1 is October, 4 is January, 12 is September.
///
/// A month with no observed values holds `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyClimatology {
    pub metric: String,
    values: [f64; 12],
    counts: [usize; 12],
}

impl MonthlyClimatology {
    /// Always 12.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Average at a water-year position (1..=12).
    pub fn get(&self, position: usize) -> Option<f64> {
        match position {
            1..=12 => Some(self.values[position - 1]),
            _ => None,
        }
    }

    /// Average for a calendar month (1 = January).
    pub fn for_calendar_month(&self, month: u32) -> Option<f64> {
        position_of_month(month).and_then(|position| self.get(position))
    }

    /// Number of values averaged at a water-year position.
    pub fn observations(&self, position: usize) -> usize {
        match position {
            1..=12 => self.counts[position - 1],
            _ => 0,
        }
    }

    /// `(position, average)` pairs from October through September.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| (i + 1, *value))
    }

    /// `(label, calendar month, average)` rows for display.
    pub fn labelled(&self) -> Vec<(&'static str, u32, f64)> {
        self.iter()
            .filter_map(|(position, value)| {
                month_at_position(position).map(|month| (position_label(position), month, value))
            })
            .collect()
    }
}

/// Average `metric` over every year of a station's monthly table, per
/// calendar month, arranged in water-year order.
///
/// Rows are grouped by the month of their date, so the table may start in
/// any month and may skip months. Missing cells are left out of the mean.
pub fn monthly_averages(monthly: &MetricsTable, metric: &str) -> Result<MonthlyClimatology> {
    let index = monthly.column_index(metric)?;
    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    for row in monthly.rows() {
        let Some(position) = position_of_month(row.date.month()) else {
            continue;
        };
        if let Some(value) = row.get(index) {
            sums[position - 1] += value;
            counts[position - 1] += 1;
        }
    }
    let mut values = [f64::NAN; 12];
    for (i, value) in values.iter_mut().enumerate() {
        if counts[i] > 0 {
            *value = sums[i] / counts[i] as f64;
        }
    }
    debug!(
        "monthly climatology of {metric} from {} rows ({} empty months)",
        monthly.len(),
        counts.iter().filter(|c| **c == 0).count()
    );
    Ok(MonthlyClimatology {
        metric: metric.to_string(),
        values,
        counts,
    })
}

/// [`monthly_averages`] over the rows of one station.
pub fn monthly_averages_for_station(
    monthly: &MetricsTable,
    station: &str,
    metric: &str,
) -> Result<MonthlyClimatology> {
    monthly_averages(&monthly.for_station(station), metric)
}
