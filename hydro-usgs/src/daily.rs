//! Daily discharge records in USGS RDB text form.
//!
//! The loader accepts the whitespace (or tab) delimited layout written by the
//! USGS NWIS daily values service:
//!
//! ```text
//! # comment lines are ignored
//! agency_cd	site_no	datetime	discharge	quality
//! 5s	15s	20d	14n	10s
//! USGS	03335000	2014-10-01	41.2	A
//! USGS	03335000	2014-10-02	Eqp
//! ```
//!
//! Discharge cells holding a sentinel token (`Eqp` by default), no value at
//! all, or any other non-numeric code (`Ice`, `Ssn`, `***`) become missing.
//! Negative readings are physically invalid and are normalized to missing in a
//! second pass after parsing. Only the column structure and the date format
//! can fail a load.

use crate::date_range::DateRange;
use crate::error::{HydroError, ParseErrorKind, Result};
use chrono::NaiveDate;
use hydro_utils::dates::DATE_FORMAT;
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

/// Sentinel tokens treated as "no data" unless the loader is configured otherwise.
pub const DEFAULT_MISSING_TOKENS: [&str; 1] = ["Eqp"];

/// Number of missing-marker discharge entries in a series or sub-range.
pub type MissingCount = usize;

/// A single day's reading from a gauging station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyObservation {
    pub agency_cd: String,
    pub site_no: String,
    pub date: NaiveDate,
    /// Discharge in cubic feet per second; `None` is the missing marker.
    pub discharge: Option<f64>,
    /// Data-quality flag, passed through untouched. Empty when absent.
    pub quality: String,
}

/// Daily observations for one station, strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    observations: Vec<DailyObservation>,
}

/// Where the missing entries of a freshly loaded series came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MissingSummary {
    /// Discharge cells holding a sentinel token.
    pub sentinel: usize,
    /// Discharge cells that were empty, `NaN`, or not present in the row.
    pub absent: usize,
    /// Discharge cells holding an unrecognized code such as `Ice` or `***`.
    pub invalid: usize,
    /// Negative readings normalized to missing.
    pub negative: usize,
    /// Calendar days between the first and last date with no row at all.
    pub gap_days: usize,
}

impl MissingSummary {
    /// Missing-marker entries in the series. Gap days have no row and are not counted.
    pub fn total(&self) -> MissingCount {
        self.sentinel + self.absent + self.invalid + self.negative
    }
}

impl DailySeries {
    /// Build a series from `(line, observation)` rows in file order.
    ///
    /// Rows are sorted by date and negative discharge is normalized to missing;
    /// the number of readings normalized is returned with the series. A date
    /// seen twice is rejected at the line that repeats it.
    fn from_rows(
        mut rows: Vec<(usize, DailyObservation)>,
    ) -> std::result::Result<(DailySeries, usize), (usize, ParseErrorKind)> {
        // stable, so equal dates stay in file order
        rows.sort_by_key(|(_, obs)| obs.date);
        if let Some(pair) = rows.windows(2).find(|w| w[0].1.date == w[1].1.date) {
            return Err((pair[1].0, ParseErrorKind::DuplicateDate(pair[1].1.date)));
        }
        let mut series = DailySeries {
            observations: rows.into_iter().map(|(_, obs)| obs).collect(),
        };
        let negative = series.normalize_negative_discharge();
        Ok((series, negative))
    }

    /// Replace negative discharge with the missing marker. Returns how many
    /// readings were replaced.
    fn normalize_negative_discharge(&mut self) -> usize {
        let mut replaced = 0;
        for obs in &mut self.observations {
            if matches!(obs.discharge, Some(v) if v < 0.0) {
                obs.discharge = None;
                replaced += 1;
            }
        }
        replaced
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyObservation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|obs| obs.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|obs| obs.date)
    }

    /// Site number of the first observation, if any.
    pub fn site_no(&self) -> Option<&str> {
        self.observations.first().map(|obs| obs.site_no.as_str())
    }

    /// Look up the observation recorded on a date.
    pub fn get(&self, date: NaiveDate) -> Option<&DailyObservation> {
        self.observations
            .binary_search_by_key(&date, |obs| obs.date)
            .ok()
            .map(|i| &self.observations[i])
    }

    /// Count the missing-marker discharge entries.
    pub fn missing_count(&self) -> MissingCount {
        self.observations
            .iter()
            .filter(|obs| obs.discharge.is_none())
            .count()
    }

    /// New series holding only the observations dated within `[start, end]`.
    /// An inverted range yields an empty series.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> DailySeries {
        if start > end {
            return DailySeries::default();
        }
        let lo = self.observations.partition_point(|obs| obs.date < start);
        let hi = self.observations.partition_point(|obs| obs.date <= end);
        DailySeries {
            observations: self.observations[lo..hi].to_vec(),
        }
    }

    /// Count calendar days in `[start, end]` that have no row in the series.
    pub fn absent_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        DateRange::new(start, end)
            .filter(|day| self.get(*day).is_none())
            .count()
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a DailyObservation;
    type IntoIter = std::slice::Iter<'a, DailyObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// How a discharge cell was read.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DischargeCell {
    Value(f64),
    Sentinel,
    Absent,
    Invalid,
}

/// Parses USGS daily discharge text into a [`DailySeries`].
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    missing_tokens: Vec<String>,
}

impl Default for SeriesLoader {
    fn default() -> Self {
        SeriesLoader {
            missing_tokens: DEFAULT_MISSING_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SeriesLoader {
    pub fn new() -> Self {
        SeriesLoader::default()
    }

    /// Use a custom set of sentinel tokens instead of the defaults.
    pub fn with_missing_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SeriesLoader {
            missing_tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Read and parse a daily record file. The path names the origin in errors.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<(DailySeries, MissingCount)> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| HydroError::Io {
            path: origin.clone(),
            source,
        })?;
        self.load_str(&origin, &text)
    }

    /// Parse daily record text, returning the series and its missing count.
    pub fn load_str(&self, origin: &str, text: &str) -> Result<(DailySeries, MissingCount)> {
        let (series, summary) = self.load_str_with_summary(origin, text)?;
        Ok((series, summary.total()))
    }

    /// Parse daily record text, returning the series and a breakdown of its
    /// missing entries.
    pub fn load_str_with_summary(
        &self,
        origin: &str,
        text: &str,
    ) -> Result<(DailySeries, MissingSummary)> {
        let mut summary = MissingSummary::default();
        let mut rows = Vec::new();
        let mut header_seen = false;
        let mut format_checked = false;

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let tokens = split_row(line);
            if !header_seen {
                header_seen = true;
                debug!("{origin}: skipping header on line {line_number}");
                continue;
            }
            if !format_checked {
                format_checked = true;
                if is_rdb_format_line(&tokens) {
                    debug!("{origin}: skipping column format line {line_number}");
                    continue;
                }
            }

            let (cell, quality) = match tokens.len() {
                3 => (DischargeCell::Absent, ""),
                // a lone non-numeric last token is a quality flag on an empty discharge
                4 => match self.read_discharge(tokens[3]) {
                    DischargeCell::Invalid => (DischargeCell::Absent, tokens[3]),
                    cell => (cell, ""),
                },
                5 => (self.read_discharge(tokens[3]), tokens[4]),
                found => {
                    return Err(HydroError::parse(
                        origin,
                        line_number,
                        ParseErrorKind::ColumnCount {
                            expected: "3 to 5".to_string(),
                            found,
                        },
                    ));
                }
            };
            let date = NaiveDate::parse_from_str(tokens[2], DATE_FORMAT).map_err(|_| {
                HydroError::parse(
                    origin,
                    line_number,
                    ParseErrorKind::Date(tokens[2].to_string()),
                )
            })?;
            let discharge = match cell {
                DischargeCell::Value(v) => Some(v),
                DischargeCell::Sentinel => {
                    summary.sentinel += 1;
                    None
                }
                DischargeCell::Absent => {
                    summary.absent += 1;
                    None
                }
                DischargeCell::Invalid => {
                    debug!("{origin}: unrecognized discharge `{}` on line {line_number}", tokens[3]);
                    summary.invalid += 1;
                    None
                }
            };
            rows.push((
                line_number,
                DailyObservation {
                    agency_cd: tokens[0].to_string(),
                    site_no: tokens[1].to_string(),
                    date,
                    discharge,
                    quality: quality.to_string(),
                },
            ));
        }

        let (series, negative) = DailySeries::from_rows(rows)
            .map_err(|(line, kind)| HydroError::parse(origin, line, kind))?;
        summary.negative = negative;
        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            summary.gap_days = series.absent_days(first, last);
        }

        info!(
            "{origin}: loaded {} daily values ({} missing: {} sentinel, {} absent, {} invalid, {} negative; {} days without a row)",
            series.len(),
            summary.total(),
            summary.sentinel,
            summary.absent,
            summary.invalid,
            summary.negative,
            summary.gap_days
        );
        Ok((series, summary))
    }

    fn read_discharge(&self, token: &str) -> DischargeCell {
        if self.missing_tokens.iter().any(|t| t == token) {
            return DischargeCell::Sentinel;
        }
        if token.is_empty() || token.eq_ignore_ascii_case("nan") {
            return DischargeCell::Absent;
        }
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => DischargeCell::Value(v),
            _ => DischargeCell::Invalid,
        }
    }
}

/// Split a data row. Tab-delimited rows keep empty cells so a blank discharge
/// stays in its column; anything else splits on runs of whitespace.
fn split_row(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        let mut tokens: Vec<&str> = line.split('\t').map(str::trim).collect();
        while tokens.last().is_some_and(|t| t.is_empty()) {
            tokens.pop();
        }
        tokens
    } else {
        line.split_whitespace().collect()
    }
}

/// RDB files follow the header with a column format line such as `5s 15s 20d 14n 10s`.
fn is_rdb_format_line(tokens: &[&str]) -> bool {
    !tokens.is_empty()
        && tokens.iter().all(|token| {
            match token.strip_suffix(|c: char| matches!(c, 's' | 'd' | 'n')) {
                Some(width) => !width.is_empty() && width.chars().all(|c| c.is_ascii_digit()),
                None => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateRange;
    use std::fmt::Write;

    const STR_RESULT: &str = "\
# ---------------------------------- WARNING ----------------------------------------
# Some of the data that you have obtained from this U.S. Geological Survey database
# may not have received Director's approval.
#
agency_cd\tsite_no\tdatetime\t01_00060_00003\t01_00060_00003_cd
5s\t15s\t20d\t14n\t10s
USGS\t03335000\t2014-10-01\t41.2\tA
USGS\t03335000\t2014-10-02\tEqp\t
USGS\t03335000\t2014-10-03\t-5\tA
USGS\t03335000\t2014-10-04\t\tA
USGS\t03335000\t2014-10-05\t55\tA:e
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_rdb_text() {
        let (series, missing) = SeriesLoader::new().load_str("wildcat", STR_RESULT).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(missing, 3);
        assert_eq!(series.get(date(2014, 10, 1)).unwrap().discharge, Some(41.2));
        assert_eq!(series.get(date(2014, 10, 2)).unwrap().discharge, None);
        assert_eq!(series.get(date(2014, 10, 3)).unwrap().discharge, None);
        assert_eq!(series.get(date(2014, 10, 4)).unwrap().quality, "A");
        assert_eq!(series.get(date(2014, 10, 5)).unwrap().quality, "A:e");
        assert_eq!(series.site_no(), Some("03335000"));
    }

    #[test]
    fn test_missing_summary_breakdown() {
        let (_, summary) = SeriesLoader::new()
            .load_str_with_summary("wildcat", STR_RESULT)
            .unwrap();
        assert_eq!(summary.sentinel, 1);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.gap_days, 0);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_no_negative_discharge_survives() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-01 -0.5 A
USGS 03331500 2016-01-02 0 A
USGS 03331500 2016-01-03 -1200 A
USGS 03331500 2016-01-04 12 A
";
        let (series, missing) = SeriesLoader::new().load_str("tippe", text).unwrap();
        assert_eq!(missing, 2);
        assert!(series
            .iter()
            .all(|obs| obs.discharge.map_or(true, |v| v >= 0.0)));
        assert_eq!(series.get(date(2016, 1, 2)).unwrap().discharge, Some(0.0));
    }

    #[test]
    fn test_whitespace_rows_with_absent_columns() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-01
USGS 03331500 2016-01-02 Eqp
USGS 03331500 2016-01-03 7.5
";
        let (series, missing) = SeriesLoader::new().load_str("tippe", text).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(missing, 2);
        assert_eq!(series.get(date(2016, 1, 3)).unwrap().discharge, Some(7.5));
        assert_eq!(series.get(date(2016, 1, 3)).unwrap().quality, "");
    }

    #[test]
    fn test_out_of_order_rows_are_sorted_and_gaps_counted() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-05 3 A
USGS 03331500 2016-01-01 1 A
USGS 03331500 2016-01-02 2 A
";
        let (series, summary) = SeriesLoader::new()
            .load_str_with_summary("tippe", text)
            .unwrap();
        assert_eq!(series.first_date(), Some(date(2016, 1, 1)));
        assert_eq!(series.last_date(), Some(date(2016, 1, 5)));
        assert_eq!(summary.gap_days, 2);
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_unrecognized_discharge_codes_are_missing() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-01 Ice A
USGS 03331500 2016-01-02 Eqp A
USGS 03331500 2016-01-03 *** A
USGS 03331500 2016-01-04 8.5 A
";
        let (series, summary) = SeriesLoader::new()
            .load_str_with_summary("tippe", text)
            .unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.get(date(2016, 1, 1)).unwrap().discharge, None);
        assert_eq!(series.get(date(2016, 1, 1)).unwrap().quality, "A");
        assert_eq!(series.get(date(2016, 1, 4)).unwrap().discharge, Some(8.5));
        assert_eq!(summary.invalid, 2);
        assert_eq!(summary.sentinel, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(series.missing_count(), summary.total());

        // configured as a sentinel, `Ice` moves buckets but stays missing
        let loader = SeriesLoader::with_missing_tokens(["Eqp", "Ice"]);
        let (_, summary) = loader.load_str_with_summary("tippe", text).unwrap();
        assert_eq!(summary.sentinel, 2);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_quality_flag_without_discharge() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-01 4 A
USGS 03331500 2016-01-02 P
USGS 03331500 2016-01-03 Eqp
";
        let (series, summary) = SeriesLoader::new()
            .load_str_with_summary("tippe", text)
            .unwrap();
        let flagged = series.get(date(2016, 1, 2)).unwrap();
        assert_eq!(flagged.discharge, None);
        assert_eq!(flagged.quality, "P");
        assert_eq!(series.get(date(2016, 1, 3)).unwrap().quality, "");
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.sentinel, 1);
        assert_eq!(summary.invalid, 0);
    }

    #[test]
    fn test_rows_on_last_representable_dates() {
        let last = NaiveDate::MAX;
        let before = last.pred_opt().unwrap();
        let text = format!(
            "agency_cd site_no Date Discharge Quality\nUSGS 03331500 {before} 1 A\nUSGS 03331500 {last} 2 A\n"
        );
        let (series, summary) = SeriesLoader::new()
            .load_str_with_summary("tippe", &text)
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_date(), Some(last));
        assert_eq!(summary.gap_days, 0);
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 01/02/2016 4 A
";
        let err = SeriesLoader::new().load_str("tippe", text).unwrap_err();
        match err {
            HydroError::Parse { origin, line, kind } => {
                assert_eq!(origin, "tippe");
                assert_eq!(line, 2);
                assert_eq!(kind, ParseErrorKind::Date("01/02/2016".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_column_count_is_parse_error() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-01 4 A extra
";
        let err = SeriesLoader::new().load_str("tippe", text).unwrap_err();
        assert_eq!(
            err.parse_kind(),
            Some(&ParseErrorKind::ColumnCount {
                expected: "3 to 5".to_string(),
                found: 6
            })
        );
    }

    #[test]
    fn test_duplicate_date_is_parse_error() {
        let text = "\
agency_cd site_no Date Discharge Quality
USGS 03331500 2016-01-01 4 A
USGS 03331500 2015-12-31 -2 A
USGS 03331500 2016-01-01 5 A
";
        let err = SeriesLoader::new().load_str("tippe", text).unwrap_err();
        match err {
            HydroError::Parse { line, kind, .. } => {
                assert_eq!(line, 4);
                assert_eq!(kind, ParseErrorKind::DuplicateDate(date(2016, 1, 1)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_gives_empty_series() {
        let (series, missing) = SeriesLoader::new()
            .load_str("empty", "# nothing here\nagency_cd site_no Date Discharge Quality\n")
            .unwrap();
        assert!(series.is_empty());
        assert_eq!(missing, 0);
    }

    #[test]
    fn test_load_path_reports_file_identity() {
        let err = SeriesLoader::new()
            .load_path("/nonexistent/WildcatCreek_Discharge.txt")
            .unwrap_err();
        assert!(err.to_string().contains("WildcatCreek_Discharge.txt"));
    }

    #[test]
    fn test_between_and_absent_days() {
        let mut text = String::from("agency_cd site_no Date Discharge Quality\n");
        for day in DateRange::new(date(2015, 1, 1), date(2015, 1, 10)) {
            if day != date(2015, 1, 4) {
                writeln!(text, "USGS 03335000 {day} 10 A").unwrap();
            }
        }
        let (series, summary) = SeriesLoader::new()
            .load_str_with_summary("wildcat", &text)
            .unwrap();
        assert_eq!(summary.gap_days, 1);
        let window = series.between(date(2015, 1, 3), date(2015, 1, 6));
        assert_eq!(window.len(), 3);
        assert_eq!(series.absent_days(date(2015, 1, 1), date(2015, 1, 10)), 1);
        assert_eq!(series.absent_days(date(2014, 12, 31), date(2015, 1, 11)), 3);
        assert!(series.between(date(2015, 1, 6), date(2015, 1, 3)).is_empty());
    }
}
