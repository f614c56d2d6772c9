//! Running the streamflow pipeline from files on disk.

use anyhow::Context;
use hydro_data::climatology::monthly_averages_for_station;
use hydro_data::return_period::return_periods_for_station;
use hydro_data::{analyze_station_path, AnalysisWindow, PipelineOptions, StationAnalysis};
use hydro_usgs::{MetricsTable, SeriesLoader, StationStyle};
use hydro_utils::dates::parse_date;
use log::{error, info};
use std::path::{Path, PathBuf};

/// Arguments of the `analyze` subcommand.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub stations: String,
    pub data_dir: Option<String>,
    pub annual: String,
    pub monthly: String,
    pub start: String,
    pub end: String,
    pub metric: String,
    pub peak_column: String,
    pub missing_tokens: Vec<String>,
    pub json: bool,
}

impl AnalyzeRequest {
    fn options(&self) -> anyhow::Result<PipelineOptions> {
        let start = parse_date(&self.start)
            .with_context(|| format!("invalid window start `{}`", self.start))?;
        let end =
            parse_date(&self.end).with_context(|| format!("invalid window end `{}`", self.end))?;
        Ok(PipelineOptions {
            window: AnalysisWindow::new(start, end),
            climatology_metric: self.metric.clone(),
            peak_column: self.peak_column.clone(),
            loader: SeriesLoader::with_missing_tokens(self.missing_tokens.iter().cloned()),
        })
    }

    /// Directory daily files are resolved against.
    fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(&self.stations)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// Resolve a station's daily file against the data directory.
pub fn daily_path(data_dir: &Path, style: &StationStyle) -> PathBuf {
    let file = Path::new(&style.daily_file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir.join(file)
    }
}

/// Load the station styles fixture.
pub fn load_styles(path: &str) -> anyhow::Result<Vec<StationStyle>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read station styles {path}"))?;
    Ok(StationStyle::parse_station_csv(path, &text)?)
}

/// Run the pipeline for every station in the fixture.
///
/// A station whose daily file fails to load is logged and skipped; the run
/// fails only when no station could be analyzed.
pub fn analyze_all(request: &AnalyzeRequest) -> anyhow::Result<Vec<StationAnalysis>> {
    let options = request.options()?;
    let styles = load_styles(&request.stations)?;
    let annual = MetricsTable::load_path(&request.annual)?;
    let monthly = MetricsTable::load_path(&request.monthly)?;
    let data_dir = request.data_dir();

    info!(
        "Analyzing {} stations from {} to {}",
        styles.len(),
        options.window.start,
        options.window.end
    );

    let mut analyses = Vec::with_capacity(styles.len());
    let mut failures = 0usize;
    for style in &styles {
        let path = daily_path(&data_dir, style);
        match analyze_station_path(style, &path, &annual, &monthly, &options) {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => {
                error!("Skipping {}: {e}", style.key);
                failures += 1;
            }
        }
    }
    if analyses.is_empty() && failures > 0 {
        anyhow::bail!("none of the {failures} stations could be analyzed");
    }
    Ok(analyses)
}

pub fn run_analyze(request: &AnalyzeRequest) -> anyhow::Result<()> {
    let analyses = analyze_all(request)?;
    if request.json {
        println!("{}", serde_json::to_string_pretty(&analyses)?);
    } else {
        print!("{}", crate::report::render_analyses(&analyses));
    }
    Ok(())
}

pub fn run_climatology(monthly: &str, station: &str, metric: &str) -> anyhow::Result<()> {
    let table = MetricsTable::load_path(monthly)?;
    let climatology = monthly_averages_for_station(&table, station, metric)?;
    print!("{}", crate::report::render_climatology(&climatology));
    Ok(())
}

pub fn run_return_periods(annual: &str, station: &str, peak_column: &str) -> anyhow::Result<()> {
    let table = MetricsTable::load_path(annual)?;
    let curve = return_periods_for_station(&table, station, peak_column)?;
    print!("{}", crate::report::render_return_periods(&curve));
    Ok(())
}
