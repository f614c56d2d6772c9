//! Derivations over streamflow records.
//!
//! This crate turns loaded daily series and metric tables into the
//! comparison series used to characterize a river over an analysis window:
//! clipped daily flow, monthly climatology in water-year order, annual
//! variability indices and the flood-frequency (return period) curve.

pub mod annual;
pub mod climatology;
pub mod pipeline;
pub mod return_period;
pub mod summary;
pub mod window;

pub use annual::MetricSeries;
pub use climatology::{monthly_averages, MonthlyClimatology};
pub use pipeline::{analyze_station, analyze_station_path, PipelineOptions, StationAnalysis};
pub use return_period::{return_periods, ReturnPeriodCurve, ReturnPeriodPoint};
pub use summary::DischargeSummary;
pub use window::{clip, AnalysisWindow, Clip};
