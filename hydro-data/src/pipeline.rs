//! Per-station analysis: load, clip, then derive every comparison series.

use crate::annual::{self, MetricSeries};
use crate::climatology::{self, MonthlyClimatology, DEFAULT_METRIC};
use crate::return_period::{self, ReturnPeriodCurve, DEFAULT_PEAK_COLUMN};
use crate::summary::DischargeSummary;
use crate::window::AnalysisWindow;
use hydro_usgs::{
    DailySeries, HydroError, MetricsTable, MissingCount, MissingSummary, Result, SeriesLoader,
    StationStyle,
};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

/// Settings shared by every station in a run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub window: AnalysisWindow,
    /// Monthly metric averaged into the climatology
    pub climatology_metric: String,
    /// Annual column ranked for return periods
    pub peak_column: String,
    pub loader: SeriesLoader,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            window: AnalysisWindow::default(),
            climatology_metric: DEFAULT_METRIC.to_string(),
            peak_column: DEFAULT_PEAK_COLUMN.to_string(),
            loader: SeriesLoader::default(),
        }
    }
}

/// Everything derived for one station.
#[derive(Debug, Clone, Serialize)]
pub struct StationAnalysis {
    pub style: StationStyle,
    /// Missing entries over the full span of the daily file
    pub full_missing: MissingCount,
    pub missing_summary: MissingSummary,
    pub window: AnalysisWindow,
    /// Daily series clipped to the window
    pub daily: DailySeries,
    /// Missing entries inside the window
    pub window_missing: MissingCount,
    pub discharge_summary: Option<DischargeSummary>,
    pub monthly_climatology: MonthlyClimatology,
    pub coefficient_of_variation: MetricSeries,
    pub tqmean: MetricSeries,
    pub rb_index: MetricSeries,
    pub return_periods: ReturnPeriodCurve,
}

/// Run the pipeline for one station from in-memory daily text.
///
/// `annual` and `monthly` may hold every station; rows are matched on the
/// style's key.
pub fn analyze_station(
    style: &StationStyle,
    daily_origin: &str,
    daily_text: &str,
    annual: &MetricsTable,
    monthly: &MetricsTable,
    options: &PipelineOptions,
) -> Result<StationAnalysis> {
    let (series, missing_summary) = options.loader.load_str_with_summary(daily_origin, daily_text)?;
    derive(style, series, missing_summary, annual, monthly, options)
}

/// Run the pipeline for one station, reading its daily file from disk.
pub fn analyze_station_path<P: AsRef<Path>>(
    style: &StationStyle,
    daily_path: P,
    annual: &MetricsTable,
    monthly: &MetricsTable,
    options: &PipelineOptions,
) -> Result<StationAnalysis> {
    let path = daily_path.as_ref();
    let origin = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| HydroError::Io {
        path: origin.clone(),
        source,
    })?;
    analyze_station(style, &origin, &text, annual, monthly, options)
}

fn derive(
    style: &StationStyle,
    series: DailySeries,
    missing_summary: MissingSummary,
    annual: &MetricsTable,
    monthly: &MetricsTable,
    options: &PipelineOptions,
) -> Result<StationAnalysis> {
    let station = style.key.as_str();
    let window = options.window;
    let (daily, window_missing) = window.clip(&series);
    if daily.is_empty() {
        warn!(
            "{station}: no daily values between {} and {}",
            window.start, window.end
        );
    }

    let station_annual = annual.for_station(station);
    let station_monthly = monthly.for_station(station);
    if station_annual.is_empty() {
        warn!("{station}: no annual metric rows");
    }
    if station_monthly.is_empty() {
        warn!("{station}: no monthly metric rows");
    }

    let analysis = StationAnalysis {
        style: style.clone(),
        full_missing: missing_summary.total(),
        missing_summary,
        window,
        discharge_summary: DischargeSummary::compute(&daily),
        daily,
        window_missing,
        monthly_climatology: climatology::monthly_averages(
            &station_monthly,
            &options.climatology_metric,
        )?,
        coefficient_of_variation: annual::coefficient_of_variation(&station_annual, station)?,
        tqmean: annual::tqmean(&station_annual, station)?,
        rb_index: annual::rb_index(&station_annual, station)?,
        return_periods: return_period::return_periods(&station_annual, &options.peak_column)?,
    };
    info!(
        "{station}: {} daily values in window ({} missing), {} annual peaks ranked",
        analysis.daily.len(),
        analysis.window_missing,
        analysis.return_periods.len()
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const DAILY: &str = "\
# USGS 03335000 WILDCAT CREEK NEAR LAFAYETTE, IN
agency_cd\tsite_no\tdatetime\t01_00060_00003\t01_00060_00003_cd
5s\t15s\t20d\t14n\t10s
USGS\t03335000\t2014-09-30\t10\tA
USGS\t03335000\t2014-10-01\t12\tA
USGS\t03335000\t2014-10-02\tEqp\t
USGS\t03335000\t2014-10-03\t-5\tA
USGS\t03335000\t2019-09-30\t20\tA
USGS\t03335000\t2019-10-01\tEqp\t
";

    const ANNUAL: &str = "\
Date,site_no,Mean Flow,Peak Flow,Median Flow,Coeff Var,Skew,Tqmean,R-B Index,7Q,3xMedian,Station
2015-10-01,3335000,351.2,100,120,210.4,4.1,0.25,0.29,11.2,1,Wildcat
2016-10-01,3335000,298.7,200,101,190.2,3.6,0.27,0.31,9.8,2,Wildcat
2017-10-01,3335000,298.7,200,101,190.2,3.6,0.27,0.31,9.8,2,Wildcat
2018-10-01,3335000,298.7,400,101,190.2,3.6,0.27,0.31,9.8,2,Wildcat
2015-10-01,3331500,1030.5,8800,780,95.1,1.8,0.36,0.08,160,0,Tippe
";

    const MONTHLY: &str = "\
Date,site_no,Mean Flow,Coeff Var,Tqmean,R-B Index,Station
2015-10-01,3335000,40,1,0.2,0.1,Wildcat
2015-11-01,3335000,60,1,0.2,0.1,Wildcat
2015-10-01,3331500,900,1,0.2,0.1,Tippe
";

    fn style() -> StationStyle {
        StationStyle {
            key: "Wildcat".to_string(),
            display_name: "Wildcat Creek".to_string(),
            daily_file: "wildcat.txt".to_string(),
            color: "red".to_string(),
            marker: "*".to_string(),
        }
    }

    fn tables() -> (MetricsTable, MetricsTable) {
        (
            MetricsTable::parse_csv("Annual_Metrics.csv", ANNUAL).unwrap(),
            MetricsTable::parse_csv("Monthly_Metrics.csv", MONTHLY).unwrap(),
        )
    }

    #[test]
    fn test_analyze_station() {
        let (annual, monthly) = tables();
        let analysis = analyze_station(
            &style(),
            "wildcat.txt",
            DAILY,
            &annual,
            &monthly,
            &PipelineOptions::default(),
        )
        .unwrap();
        assert_eq!(analysis.full_missing, 3);
        assert_eq!(analysis.daily.len(), 4);
        assert_eq!(analysis.window_missing, 2);
        assert_eq!(
            analysis.daily.first_date(),
            NaiveDate::from_ymd_opt(2014, 10, 1)
        );
        assert_eq!(analysis.monthly_climatology.get(1), Some(40.0));
        assert_eq!(analysis.monthly_climatology.get(2), Some(60.0));
        assert!(analysis.monthly_climatology.get(3).unwrap().is_nan());
        assert_eq!(analysis.coefficient_of_variation.len(), 4);
        assert_eq!(analysis.tqmean.len(), 4);
        assert_eq!(analysis.rb_index.len(), 4);

        let probabilities: Vec<f64> = analysis
            .return_periods
            .iter()
            .map(|p| p.exceedance_probability)
            .collect();
        assert_eq!(probabilities, vec![20.0, 50.0, 50.0, 80.0]);
        let summary = analysis.discharge_summary.unwrap();
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn test_station_without_metrics() {
        let (annual, monthly) = tables();
        let mut style = style();
        style.key = "Eel".to_string();
        let analysis = analyze_station(
            &style,
            "eel.txt",
            DAILY,
            &annual,
            &monthly,
            &PipelineOptions::default(),
        )
        .unwrap();
        assert!(analysis.return_periods.is_empty());
        assert!(analysis.coefficient_of_variation.is_empty());
        assert_eq!(analysis.monthly_climatology.len(), 12);
    }

    #[test]
    fn test_parse_failure_names_file() {
        let (annual, monthly) = tables();
        let err = analyze_station(
            &style(),
            "wildcat.txt",
            "header\nUSGS 03335000 not-a-date 1 A\n",
            &annual,
            &monthly,
            &PipelineOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("wildcat.txt"));
    }

    #[test]
    fn test_missing_daily_file() {
        let (annual, monthly) = tables();
        let err = analyze_station_path(
            &style(),
            "/nonexistent/wildcat.txt",
            &annual,
            &monthly,
            &PipelineOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HydroError::Io { .. }));
    }
}
