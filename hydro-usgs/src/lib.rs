//! Core types and loaders for USGS streamflow records.
//!
//! - [`daily`]: daily discharge series and the [`SeriesLoader`]
//! - [`metrics`]: precomputed annual/monthly metric tables
//! - [`station`]: per-station display settings for rendering
//! - [`error`]: the [`HydroError`] taxonomy shared by the hydro crates

pub mod daily;
pub mod date_range;
pub mod error;
pub mod metrics;
pub mod station;

pub use daily::{DailyObservation, DailySeries, MissingCount, MissingSummary, SeriesLoader};
pub use error::{HydroError, ParseErrorKind, Result};
pub use metrics::{MetricsRow, MetricsTable};
pub use station::StationStyle;
