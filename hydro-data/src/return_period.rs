//! Flood frequency from annual peaks using the Weibull plotting position.
//!
//! Each year's peak is ranked against every other year for the station, the
//! largest peak taking rank 1, and its exceedance probability is
//! `100 * rank / (N + 1)` percent. Tied peaks share the average of the ranks
//! they occupy.

use chrono::NaiveDate;
use hydro_usgs::metrics::PEAK_FLOW;
use hydro_usgs::{MetricsTable, Result};
use hydro_utils::water_year::water_year_for_date;
use log::debug;
use serde::Serialize;

/// Peak column ranked when the caller does not name one.
pub const DEFAULT_PEAK_COLUMN: &str = PEAK_FLOW;

/// One year of a flood-frequency curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnPeriodPoint {
    /// Period start of the annual row.
    pub date: NaiveDate,
    pub water_year: i32,
    pub peak: f64,
    /// Descending rank; 1 is the largest peak. Ties hold the average rank.
    pub rank: f64,
    /// Percent chance of the peak being equaled or exceeded in a given year.
    pub exceedance_probability: f64,
}

impl ReturnPeriodPoint {
    /// Recurrence interval in years.
    pub fn recurrence_interval(&self) -> f64 {
        100.0 / self.exceedance_probability
    }
}

/// Exceedance probabilities for a station's annual peaks, sorted by
/// probability (largest peak first).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnPeriodCurve {
    pub points: Vec<ReturnPeriodPoint>,
}

impl ReturnPeriodCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReturnPeriodPoint> {
        self.points.iter()
    }

    /// Point for the annual row starting on `date`.
    pub fn point_for(&self, date: NaiveDate) -> Option<&ReturnPeriodPoint> {
        self.points.iter().find(|point| point.date == date)
    }

    /// `(exceedance probability, peak)` pairs ready for plotting.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|point| (point.exceedance_probability, point.peak))
            .collect()
    }
}

/// Ascending ranks starting at 1, in input order. Equal values receive the
/// mean of the ranks they would occupy.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j hold ranks i+1..=j+1
        let rank = (i + j + 2) as f64 / 2.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Rank every annual peak in a single station's table.
///
/// Rows with a missing peak take no part in the ranking. An empty table
/// gives an empty curve; a single year sits at 50 %.
pub fn return_periods(annual: &MetricsTable, peak_column: &str) -> Result<ReturnPeriodCurve> {
    let index = annual.column_index(peak_column)?;
    let mut peaks: Vec<(NaiveDate, f64)> = annual
        .rows()
        .iter()
        .filter_map(|row| row.get(index).map(|peak| (row.date, peak)))
        .collect();
    // largest peak first; tied peaks in date order
    peaks.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let sorted: Vec<f64> = peaks.iter().map(|(_, peak)| *peak).collect();
    let ranks = average_ranks(&sorted);

    let n = peaks.len() as f64;
    let points: Vec<ReturnPeriodPoint> = peaks
        .into_iter()
        .zip(ranks)
        .map(|((date, peak), ascending)| {
            // flip to descending so the largest peak holds rank 1
            let rank = n + 1.0 - ascending;
            ReturnPeriodPoint {
                date,
                water_year: water_year_for_date(&date),
                peak,
                rank,
                exceedance_probability: 100.0 * (rank / (n + 1.0)),
            }
        })
        .collect();
    debug!(
        "ranked {} annual peaks from {} rows of {peak_column}",
        points.len(),
        annual.len()
    );
    Ok(ReturnPeriodCurve { points })
}

/// [`return_periods`] over the rows of one station.
pub fn return_periods_for_station(
    annual: &MetricsTable,
    station: &str,
    peak_column: &str,
) -> Result<ReturnPeriodCurve> {
    return_periods(&annual.for_station(station), peak_column)
}
