//! Restricting series and tables to an analysis window.

use chrono::NaiveDate;
use hydro_usgs::{DailySeries, MetricsTable, MissingCount};
use hydro_utils::water_year::water_year_bounds;
use log::debug;
use serde::{Deserialize, Serialize};

/// Time-indexed data that can be restricted to an inclusive date range.
///
/// Clipping always returns a new value; the input is left untouched.
pub trait Clip: Sized {
    /// Keep the rows dated within `[start, end]` and count the missing
    /// discharge entries among them.
    fn clip(&self, start: NaiveDate, end: NaiveDate) -> (Self, MissingCount);
}

impl Clip for DailySeries {
    fn clip(&self, start: NaiveDate, end: NaiveDate) -> (Self, MissingCount) {
        let clipped = self.between(start, end);
        let missing = clipped.missing_count();
        debug!(
            "clipped daily series to {start}..={end}: {} of {} rows kept, {missing} missing",
            clipped.len(),
            self.len()
        );
        (clipped, missing)
    }
}

/// Metric tables carry no discharge column, so their missing count is zero.
impl Clip for MetricsTable {
    fn clip(&self, start: NaiveDate, end: NaiveDate) -> (Self, MissingCount) {
        let clipped = self.between(start, end);
        debug!(
            "clipped metrics table to {start}..={end}: {} of {} rows kept",
            clipped.len(),
            self.len()
        );
        (clipped, 0)
    }
}

/// Restrict `data` to `[start, end]`. An inverted range gives an empty result
/// with a missing count of zero.
pub fn clip<T: Clip>(data: &T, start: NaiveDate, end: NaiveDate) -> (T, MissingCount) {
    data.clip(start, end)
}

/// Inclusive calendar window shared by every station in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for AnalysisWindow {
    /// Water years 2015 through 2019.
    fn default() -> Self {
        AnalysisWindow::water_years(2015, 2019).expect("water years 2015-2019 are valid dates")
    }
}

impl AnalysisWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        AnalysisWindow { start, end }
    }

    /// Window spanning whole water years, October 1 of the year before
    /// `first` through September 30 of `last`.
    pub fn water_years(first: i32, last: i32) -> Option<Self> {
        let (start, _) = water_year_bounds(first)?;
        let (_, end) = water_year_bounds(last)?;
        Some(AnalysisWindow { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn clip<T: Clip>(&self, data: &T) -> (T, MissingCount) {
        data.clip(self.start, self.end)
    }
}
