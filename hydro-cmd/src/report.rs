//! Plain-text rendering of derived series.

use hydro_data::{MetricSeries, MonthlyClimatology, ReturnPeriodCurve, StationAnalysis};
use hydro_utils::dates::format_date;

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.3}"),
        _ => "NaN".to_string(),
    }
}

/// Twelve rows, October first.
pub fn render_climatology(climatology: &MonthlyClimatology) -> String {
    let mut out = format!("position,month,{}\n", climatology.metric);
    for (i, (label, _month, value)) in climatology.labelled().into_iter().enumerate() {
        out.push_str(&format!("{},{label},{}\n", i + 1, fmt_value(Some(value))));
    }
    out
}

/// One row per ranked year, smallest exceedance probability first.
pub fn render_return_periods(curve: &ReturnPeriodCurve) -> String {
    let mut out = String::from("date,water_year,peak,rank,exceedance_pct,recurrence_years\n");
    for point in curve.iter() {
        out.push_str(&format!(
            "{},{},{},{},{:.2},{:.2}\n",
            format_date(&point.date),
            point.water_year,
            point.peak,
            point.rank,
            point.exceedance_probability,
            point.recurrence_interval()
        ));
    }
    out
}

fn render_series(out: &mut String, series: &MetricSeries) {
    out.push_str(&format!("  {}:\n", series.metric));
    for (date, value) in &series.points {
        out.push_str(&format!("    {} {}\n", format_date(date), fmt_value(*value)));
    }
}

/// Human-readable summary of every analyzed station.
pub fn render_analyses(analyses: &[StationAnalysis]) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();
    for analysis in analyses {
        out.push_str(&format!(
            "{rule}\n{} ({})\n{rule}\n",
            analysis.style.display_name, analysis.style.key
        ));
        out.push_str(&format!(
            "Missing values over full record: {}\n",
            analysis.full_missing
        ));
        out.push_str(&format!(
            "Window {} to {}: {} daily values, {} missing\n",
            format_date(&analysis.window.start),
            format_date(&analysis.window.end),
            analysis.daily.len(),
            analysis.window_missing
        ));
        if let Some(summary) = &analysis.discharge_summary {
            out.push_str(&format!(
                "Discharge (cfs): mean {:.1}, median {:.1}, min {:.1}, max {:.1}\n",
                summary.mean, summary.median, summary.min, summary.max
            ));
        }
        out.push_str("\nMonthly climatology\n");
        out.push_str(&render_climatology(&analysis.monthly_climatology));
        out.push_str("\nAnnual series\n");
        render_series(&mut out, &analysis.coefficient_of_variation);
        render_series(&mut out, &analysis.tqmean);
        render_series(&mut out, &analysis.rb_index);
        out.push_str("\nReturn periods\n");
        out.push_str(&render_return_periods(&analysis.return_periods));
        out.push('\n');
    }
    out
}
