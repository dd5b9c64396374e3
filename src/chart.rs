use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::models::MonthlyAggregate;

const TITLE: &str = "Product Review Sentiments Overtime";
const COUNTS_TITLE: &str = "Product Review Sentiment Counts Overtime";
const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 140.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;
/// Most x-axis labels drawn before thinning kicks in.
const MAX_X_LABELS: usize = 12;

const SERIES: &[(&str, &str)] = &[
    ("positive", "#2ca02c"),
    ("negative", "#d62728"),
    ("neutral", "#7f7f7f"),
];

/// Which columns of the monthly series a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartValue {
    Percent,
    Count,
}

impl ChartValue {
    fn title(self) -> &'static str {
        match self {
            ChartValue::Percent => TITLE,
            ChartValue::Count => COUNTS_TITLE,
        }
    }

    fn of(self, m: &MonthlyAggregate, series: &str) -> f64 {
        match (self, series) {
            (ChartValue::Percent, "positive") => m.pos_pct,
            (ChartValue::Percent, "negative") => m.neg_pct,
            (ChartValue::Percent, _) => m.neu_pct,
            (ChartValue::Count, "positive") => m.positive_count as f64,
            (ChartValue::Count, "negative") => m.negative_count as f64,
            (ChartValue::Count, _) => m.neutral_count as f64,
        }
    }

    /// Top of the y axis. Counts round up to a multiple of 4 so every tick is whole.
    fn axis_max(self, series: &[MonthlyAggregate]) -> f64 {
        match self {
            ChartValue::Percent => 100.0,
            ChartValue::Count => {
                let peak = series
                    .iter()
                    .map(|m| m.positive_count.max(m.negative_count).max(m.neutral_count))
                    .max()
                    .unwrap_or(0)
                    .max(1);
                peak.div_ceil(4) as f64 * 4.0
            }
        }
    }

    fn tick_label(self, v: f64) -> String {
        match self {
            ChartValue::Percent => format!("{}%", v),
            ChartValue::Count => format!("{:.0}", v),
        }
    }
}

pub struct ChartPaths {
    pub json: PathBuf,
    pub svg: PathBuf,
    pub counts_svg: PathBuf,
}

/// Write the monthly series as `<product>_monthly.json`, the percentage chart as
/// `<product>_sentiment.svg` and the raw counts chart as `<product>_counts.svg`.
pub fn write_outputs(
    out_dir: &Path,
    product_id: &str,
    series: &[MonthlyAggregate],
) -> Result<ChartPaths> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output dir {}", out_dir.display()))?;

    let json = out_dir.join(format!("{}_monthly.json", product_id));
    write_json(&json, series)?;

    let svg = out_dir.join(format!("{}_sentiment.svg", product_id));
    fs::write(&svg, render_svg(series, ChartValue::Percent))
        .with_context(|| format!("Failed to write {}", svg.display()))?;

    let counts_svg = out_dir.join(format!("{}_counts.svg", product_id));
    fs::write(&counts_svg, render_svg(series, ChartValue::Count))
        .with_context(|| format!("Failed to write {}", counts_svg.display()))?;

    info!(
        "Wrote {}, {} and {}",
        json.display(),
        svg.display(),
        counts_svg.display()
    );
    Ok(ChartPaths {
        json,
        svg,
        counts_svg,
    })
}

fn write_json<T: ?Sized + Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

/// Line chart of the three percentage or count columns against the month.
pub fn render_svg(series: &[MonthlyAggregate], value: ChartValue) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let n = series.len();
    let top = value.axis_max(series);

    let x_at = |i: usize| -> f64 {
        if n <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * i as f64 / (n - 1) as f64
        }
    };
    let y_at = |v: f64| -> f64 { MARGIN_TOP + plot_h * (1.0 - v / top) };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="28" font-size="18" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        value.title()
    );

    // y grid + labels
    for tick in (0..=4).map(|q| top * q as f64 / 4.0) {
        let y = y_at(tick);
        let _ = writeln!(
            svg,
            r##"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e0e0e0"/>"##,
            x1 = MARGIN_LEFT,
            x2 = MARGIN_LEFT + plot_w,
            y = y
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            MARGIN_LEFT - 8.0,
            y,
            value.tick_label(tick)
        );
    }

    // axes
    let _ = writeln!(
        svg,
        r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{bottom}" stroke="black"/>"#,
        x = MARGIN_LEFT,
        top = MARGIN_TOP,
        bottom = MARGIN_TOP + plot_h
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{left}" y1="{y}" x2="{right}" y2="{y}" stroke="black"/>"#,
        left = MARGIN_LEFT,
        right = MARGIN_LEFT + plot_w,
        y = MARGIN_TOP + plot_h
    );

    // x labels, thinned so they stay readable
    let step = n.div_ceil(MAX_X_LABELS).max(1);
    for (i, m) in series.iter().enumerate() {
        if i % step != 0 && i != n - 1 {
            continue;
        }
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            x_at(i),
            MARGIN_TOP + plot_h + 20.0,
            m.period
        );
    }

    for (row, (name, color)) in SERIES.iter().enumerate() {
        let points: Vec<String> = series
            .iter()
            .enumerate()
            .filter(|(_, m)| !value.of(m, name).is_nan())
            .map(|(i, m)| format!("{:.1},{:.1}", x_at(i), y_at(value.of(m, name))))
            .collect();

        if !points.is_empty() {
            let _ = writeln!(
                svg,
                r#"<polyline class="{}" fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
                name,
                color,
                points.join(" ")
            );
        }

        // legend
        let ly = MARGIN_TOP + 10.0 + row as f64 * 20.0;
        let lx = MARGIN_LEFT + plot_w + 20.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2"/>"#,
            lx,
            ly,
            lx + 20.0,
            ly,
            color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" dominant-baseline="middle">{}</text>"#,
            lx + 26.0,
            ly,
            name
        );
    }

    svg.push_str("</svg>\n");
    svg
}
