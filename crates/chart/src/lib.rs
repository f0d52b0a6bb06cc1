//! Line-chart rendering of rate records.
//!
//! Records are grouped by bank and drawn as one polyline per bank over time,
//! sharing one plot and one legend anchored upper-left. The output is a
//! standalone SVG artifact. A bank does not need a record on every date;
//! each series carries whatever points it has.

use chrono::NaiveDate;
use models::{DATE_FORMAT, ExchangeRateRecord};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("a chart needs at least 2 records, got {0}")]
    InsufficientData(usize),
    #[error("unparseable record date {0:?}")]
    BadDate(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 520.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 50.0;

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

struct Series {
    bank: String,
    points: Vec<(NaiveDate, f64)>,
}

/// One series per bank, first-seen order, points sorted chronologically.
fn group_by_bank(records: &[ExchangeRateRecord]) -> Result<Vec<Series>, ChartError> {
    let mut series: Vec<Series> = Vec::new();
    for record in records {
        let date = NaiveDate::parse_from_str(&record.date, DATE_FORMAT)
            .map_err(|_| ChartError::BadDate(record.date.clone()))?;
        match series.iter_mut().find(|s| s.bank == record.bank) {
            Some(s) => s.points.push((date, record.rate)),
            None => series.push(Series {
                bank: record.bank.clone(),
                points: vec![(date, record.rate)],
            }),
        }
    }
    for s in &mut series {
        s.points.sort_by_key(|(date, _)| *date);
    }
    Ok(series)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Renders the records as an SVG line chart, one series per bank.
pub fn render_svg(records: &[ExchangeRateRecord]) -> Result<String, ChartError> {
    if records.len() < 2 {
        return Err(ChartError::InsufficientData(records.len()));
    }
    let series = group_by_bank(records)?;

    let mut min_date = NaiveDate::MAX;
    let mut max_date = NaiveDate::MIN;
    let mut min_rate = f64::INFINITY;
    let mut max_rate = f64::NEG_INFINITY;
    for s in &series {
        for &(date, rate) in &s.points {
            min_date = min_date.min(date);
            max_date = max_date.max(date);
            min_rate = min_rate.min(rate);
            max_rate = max_rate.max(rate);
        }
    }
    let day_span = ((max_date - min_date).num_days() as f64).max(1.0);
    let rate_span = {
        let span = max_rate - min_rate;
        if span.abs() < f64::EPSILON { 1.0 } else { span }
    };
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let x = |date: NaiveDate| {
        MARGIN_LEFT + (date - min_date).num_days() as f64 / day_span * plot_w
    };
    let y = |rate: f64| MARGIN_TOP + (max_rate - rate) / rate_span * plot_h;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\" font-size=\"12\">\n"
    ));
    svg.push_str(&format!(
        "  <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>\n"
    ));

    // axis frame
    svg.push_str(&format!(
        "  <rect x=\"{MARGIN_LEFT}\" y=\"{MARGIN_TOP}\" width=\"{plot_w}\" height=\"{plot_h}\" \
         fill=\"none\" stroke=\"#444\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\">{max_rate:.2}</text>\n",
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + 4.0
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\">{min_rate:.2}</text>\n",
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + plot_h + 4.0
    ));
    svg.push_str(&format!(
        "  <text x=\"{MARGIN_LEFT}\" y=\"{}\">{}</text>\n",
        HEIGHT - MARGIN_BOTTOM + 20.0,
        min_date.format(DATE_FORMAT)
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\">{}</text>\n",
        WIDTH - MARGIN_RIGHT,
        HEIGHT - MARGIN_BOTTOM + 20.0,
        max_date.format(DATE_FORMAT)
    ));

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<String> = s
            .points
            .iter()
            .map(|&(date, rate)| format!("{:.1},{:.1}", x(date), y(rate)))
            .collect();
        svg.push_str(&format!(
            "  <polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.5\"/>\n",
            points.join(" ")
        ));
    }

    // legend, upper left of the plot area
    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let ly = MARGIN_TOP + 16.0 + i as f64 * 18.0;
        svg.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{ly}\" x2=\"{}\" y2=\"{ly}\" stroke=\"{color}\" stroke-width=\"2\"/>\n",
            MARGIN_LEFT + 10.0,
            MARGIN_LEFT + 34.0
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\">{}</text>\n",
            MARGIN_LEFT + 40.0,
            ly + 4.0,
            escape(&s.bank)
        ));
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Renders and writes the chart to `path`.
pub fn write_svg(path: &Path, records: &[ExchangeRateRecord]) -> Result<(), ChartError> {
    let svg = render_svg(records)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, svg)?;
    Ok(())
}
