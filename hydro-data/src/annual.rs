//! Annual metric series for one station.

use chrono::NaiveDate;
use hydro_usgs::metrics::{COEFF_VAR, RB_INDEX, TQMEAN};
use hydro_usgs::{MetricsTable, Result};
use serde::Serialize;

/// One metric for one station, in date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub station: String,
    pub metric: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Extract `metric` for `station`, sorted by period start.
pub fn metric_series(table: &MetricsTable, station: &str, metric: &str) -> Result<MetricSeries> {
    let mut points = table.for_station(station).column_values(metric)?;
    points.sort_by_key(|(date, _)| *date);
    Ok(MetricSeries {
        station: station.to_string(),
        metric: metric.to_string(),
        points,
    })
}

/// Annual coefficient of variation of daily flow.
pub fn coefficient_of_variation(annual: &MetricsTable, station: &str) -> Result<MetricSeries> {
    metric_series(annual, station, COEFF_VAR)
}

/// Annual fraction of time flow exceeds the annual mean.
pub fn tqmean(annual: &MetricsTable, station: &str) -> Result<MetricSeries> {
    metric_series(annual, station, TQMEAN)
}

/// Annual Richards-Baker flashiness index.
pub fn rb_index(annual: &MetricsTable, station: &str) -> Result<MetricSeries> {
    metric_series(annual, station, RB_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydro_usgs::HydroError;

    const ANNUAL: &str = "\
Date,Coeff Var,Tqmean,R-B Index,Station
2016-10-01,190.2,0.27,0.31,Wildcat
2015-10-01,210.4,0.25,0.29,Wildcat
2015-10-01,95.1,,0.08,Tippe
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_series_sorted_by_date() {
        let table = MetricsTable::parse_csv("Annual_Metrics.csv", ANNUAL).unwrap();
        let cov = coefficient_of_variation(&table, "Wildcat").unwrap();
        assert_eq!(cov.metric, COEFF_VAR);
        assert_eq!(
            cov.points,
            vec![(date(2015, 10, 1), Some(210.4)), (date(2016, 10, 1), Some(190.2))]
        );
        assert_eq!(rb_index(&table, "Wildcat").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_values_are_kept_as_none() {
        let table = MetricsTable::parse_csv("Annual_Metrics.csv", ANNUAL).unwrap();
        let series = tqmean(&table, "Tippe").unwrap();
        assert_eq!(series.points, vec![(date(2015, 10, 1), None)]);
        assert!(series.points.iter().all(|(_, value)| value.is_none()));
    }

    #[test]
    fn test_unknown_station_is_empty() {
        let table = MetricsTable::parse_csv("Annual_Metrics.csv", ANNUAL).unwrap();
        assert!(tqmean(&table, "Eel").unwrap().is_empty());
        assert!(matches!(
            metric_series(&table, "Wildcat", "Skew"),
            Err(HydroError::UnknownMetric(_))
        ));
    }
}
