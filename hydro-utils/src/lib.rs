//! Shared utility functions for the hydro crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Date format used by USGS daily records and metric tables: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Timestamp format some metric producers write for period starts.
    pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
    }

    /// Parse a period start, accepting either a bare date or a midnight
    /// timestamp ("YYYY-MM-DD HH:MM:SS"). Returns `None` when neither fits.
    pub fn parse_period_start(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                    .ok()
                    .map(|dt| dt.date())
            })
    }

}

/// Water year arithmetic.
///
/// The US water year runs October 1 through September 30 and is named by the
/// calendar year in which it ends, so October 1 2014 starts water year 2015.
pub mod water_year {
    use chrono::{Datelike, NaiveDate};

    /// Calendar month occupying each water-year position. Index 0 is
    /// position 1 (October), index 11 is position 12 (September).
    pub const WATER_YEAR_MONTHS: [u32; 12] = [10, 11, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9];

    /// Water-year position (1..=12) of each calendar month. Index 0 is
    /// January. Kept as an explicit table rather than modular arithmetic.
    const POSITION_OF_MONTH: [usize; 12] = [4, 5, 6, 7, 8, 9, 10, 11, 12, 1, 2, 3];

    /// Get the water-year position (1..=12) for a calendar month (1..=12).
    pub fn position_of_month(month: u32) -> Option<usize> {
        match month {
            1..=12 => Some(POSITION_OF_MONTH[(month - 1) as usize]),
            _ => None,
        }
    }

    /// Get the calendar month (1..=12) sitting at a water-year position (1..=12).
    pub fn month_at_position(position: usize) -> Option<u32> {
        match position {
            1..=12 => Some(WATER_YEAR_MONTHS[position - 1]),
            _ => None,
        }
    }

    /// Get the water year for a given date.
    /// e.g., Oct 1 2014 -> 2015, Sep 30 2015 -> 2015
    pub fn water_year_for_date(date: &NaiveDate) -> i32 {
        if date.month() >= 10 {
            date.year() + 1
        } else {
            date.year()
        }
    }

    /// First and last day of a water year.
    pub fn water_year_bounds(water_year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(water_year - 1, 10, 1)?;
        let end = NaiveDate::from_ymd_opt(water_year, 9, 30)?;
        Some((start, end))
    }

    /// Short month label for a water-year position, e.g. 1 -> "Oct".
    pub fn position_label(position: usize) -> &'static str {
        const LABELS: [&str; 12] = [
            "Oct", "Nov", "Dec", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep",
        ];
        match position {
            1..=12 => LABELS[position - 1],
            _ => "?",
        }
    }

}
