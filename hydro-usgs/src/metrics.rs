//! Precomputed annual and monthly metric tables.
//!
//! Tables are comma-delimited with a header row. The first column is the
//! period start date and the `Station` column names the originating station;
//! every other column is a numeric statistic:
//!
//! ```text
//! Date,site_no,Mean Flow,Peak Flow,Median Flow,Coeff Var,Skew,Tqmean,R-B Index,7Q,3xMedian,Station
//! 2015-10-01,3335000,351.2,9630,120,210.4,4.1,0.25,0.29,11.2,1,Wildcat
//! ```
//!
//! Values are read as produced. Empty cells and `NaN` are missing.

use crate::error::{HydroError, ParseErrorKind, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use hydro_utils::dates::parse_period_start;
use log::info;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const STATION_COLUMN: &str = "Station";
pub const PEAK_FLOW: &str = "Peak Flow";
pub const MEAN_FLOW: &str = "Mean Flow";
pub const COEFF_VAR: &str = "Coeff Var";
pub const TQMEAN: &str = "Tqmean";
pub const RB_INDEX: &str = "R-B Index";

/// One period (year or month) of derived statistics for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub date: NaiveDate,
    pub station: String,
    /// One value per table column, in column order.
    pub values: Vec<Option<f64>>,
}

/// Per-period metrics, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsTable {
    columns: Vec<String>,
    rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Read and parse a metrics CSV file. The path names the origin in errors.
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<MetricsTable> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| HydroError::Io {
            path: origin.clone(),
            source,
        })?;
        MetricsTable::parse_csv(&origin, &text)
    }

    /// Parse metrics CSV text.
    pub fn parse_csv(origin: &str, csv_data: &str) -> Result<MetricsTable> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(csv_data.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| csv_error(origin, e))?
            .clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(HydroError::parse(origin, 1, ParseErrorKind::MissingHeader));
        }
        let station_index = headers
            .iter()
            .position(|h| h == STATION_COLUMN)
            .filter(|&i| i != 0)
            .ok_or_else(|| {
                HydroError::parse(
                    origin,
                    1,
                    ParseErrorKind::MissingColumn(STATION_COLUMN.to_string()),
                )
            })?;
        let value_indices: Vec<usize> = (1..headers.len()).filter(|&i| i != station_index).collect();
        let columns: Vec<String> = value_indices
            .iter()
            .map(|&i| headers[i].to_string())
            .collect();

        let mut rows = Vec::new();
        let mut keys: HashSet<(String, NaiveDate)> = HashSet::new();
        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(origin, e))?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or_default();
            let date_str = record.get(0).unwrap_or_default();
            let date = parse_period_start(date_str).ok_or_else(|| {
                HydroError::parse(origin, line, ParseErrorKind::Date(date_str.to_string()))
            })?;
            let station = record.get(station_index).unwrap_or_default().to_string();
            let mut values = Vec::with_capacity(value_indices.len());
            for (&i, column) in value_indices.iter().zip(&columns) {
                let cell = record.get(i).unwrap_or_default();
                values.push(parse_cell(cell).ok_or_else(|| {
                    HydroError::parse(
                        origin,
                        line,
                        ParseErrorKind::Number {
                            column: column.clone(),
                            value: cell.to_string(),
                        },
                    )
                })?);
            }
            if !keys.insert((station.clone(), date)) {
                return Err(HydroError::parse(
                    origin,
                    line,
                    ParseErrorKind::DuplicatePeriod { station, date },
                ));
            }
            rows.push(MetricsRow {
                date,
                station,
                values,
            });
        }

        let table = MetricsTable { columns, rows };
        info!(
            "{origin}: loaded {} metric rows for {} stations",
            table.len(),
            table.stations().len()
        );
        Ok(table)
    }

    /// Statistic column names in file order (date and station excluded).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a statistic column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| HydroError::UnknownMetric(name.to_string()))
    }

    /// Distinct station identifiers, in order of first appearance.
    pub fn stations(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.station.as_str())
            .filter(|station| seen.insert(*station))
            .collect()
    }

    /// New table holding only the rows for one station.
    pub fn for_station(&self, station: &str) -> MetricsTable {
        self.filtered(|row| row.station == station)
    }

    /// New table holding only the rows whose period starts within `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> MetricsTable {
        self.filtered(|row| start <= row.date && row.date <= end)
    }

    /// `(date, value)` pairs of one statistic, in table order.
    pub fn column_values(&self, name: &str) -> Result<Vec<(NaiveDate, Option<f64>)>> {
        let index = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| (row.date, row.values[index]))
            .collect())
    }

    fn filtered<F: Fn(&MetricsRow) -> bool>(&self, keep: F) -> MetricsTable {
        MetricsTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(*row)).cloned().collect(),
        }
    }
}

impl MetricsRow {
    /// Value of the statistic at `index` in the owning table's columns.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}

fn parse_cell(cell: &str) -> Option<Option<f64>> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    cell.parse::<f64>().ok().map(Some)
}

fn csv_error(origin: &str, err: csv::Error) -> HydroError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        let line = pos.as_ref().map(|p| p.line() as usize).unwrap_or_default();
        return HydroError::parse(
            origin,
            line,
            ParseErrorKind::ColumnCount {
                expected: expected_len.to_string(),
                found: *len as usize,
            },
        );
    }
    HydroError::Csv {
        origin: origin.to_string(),
        source: err,
    }
}
