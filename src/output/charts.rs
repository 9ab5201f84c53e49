//! SVG charts for a ranking report

use crate::error::{CvRankerError, Result};
use crate::output::report::{format_score, AnalysisReport, ReportRow};
use crate::processing::text_processor::truncate_text;
use askama::Template;
use log::debug;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

pub const PALETTE: &[&str] = &[
    "#0E6CFF", "#28A745", "#6F42C1", "#FF5733", "#FFC107", "#17A2B8", "#DC3545", "#6610F2",
];

const BACKGROUND: &str = "#16213E";
const FOREGROUND: &str = "#F5F6FA";
const GRID: &str = "#3A4466";
const LABEL_LEN: usize = 18;

fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[derive(Template)]
#[template(
    source = r##"<svg xmlns="http://www.w3.org/2000/svg" x="{{ offset_x }}" y="0" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}" font-family="Helvetica, Arial, sans-serif">
<rect width="{{ width }}" height="{{ height }}" fill="{{ background }}"/>
<text x="{{ center_x }}" y="28" text-anchor="middle" font-size="16" font-weight="bold" fill="{{ foreground }}">{{ title }}</text>
<text transform="rotate(-90 16 {{ axis_mid_y }})" x="16" y="{{ axis_mid_y }}" text-anchor="middle" font-size="12" fill="{{ foreground }}">{{ y_label }}</text>
{% for tick in ticks %}<line x1="{{ plot_left }}" y1="{{ tick.y }}" x2="{{ plot_right }}" y2="{{ tick.y }}" stroke="{{ grid }}" stroke-dasharray="4 3"/>
<text x="{{ tick_x }}" y="{{ tick.y }}" dy="4" text-anchor="end" font-size="11" fill="{{ foreground }}">{{ tick.label }}</text>
{% endfor %}<line x1="{{ plot_left }}" y1="{{ plot_bottom }}" x2="{{ plot_right }}" y2="{{ plot_bottom }}" stroke="{{ foreground }}"/>
{% for bar in bars %}<rect x="{{ bar.x }}" y="{{ bar.y }}" width="{{ bar.width }}" height="{{ bar.height }}" fill="{{ bar.color }}"/>
{% if bar.show_value %}<text x="{{ bar.center_x }}" y="{{ bar.value_y }}" text-anchor="middle" font-size="11" fill="{{ foreground }}">{{ bar.value }}</text>
{% endif %}<text transform="rotate(-45 {{ bar.center_x }} {{ label_y }})" x="{{ bar.center_x }}" y="{{ label_y }}" text-anchor="end" font-size="11" fill="{{ foreground }}">{{ bar.label }}</text>
{% endfor %}{% if bars.is_empty() %}<text x="{{ center_x }}" y="{{ axis_mid_y }}" text-anchor="middle" font-size="13" fill="{{ foreground }}">No data</text>
{% endif %}</svg>"##,
    ext = "svg"
)]
struct BarChartTemplate {
    offset_x: f32,
    width: f32,
    height: f32,
    center_x: f32,
    title: String,
    y_label: String,
    background: &'static str,
    foreground: &'static str,
    grid: &'static str,
    plot_left: f32,
    plot_right: f32,
    plot_bottom: f32,
    axis_mid_y: f32,
    tick_x: f32,
    label_y: f32,
    ticks: Vec<Tick>,
    bars: Vec<Bar>,
}

struct Tick {
    y: f32,
    label: String,
}

struct Bar {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    center_x: f32,
    value_y: f32,
    color: &'static str,
    value: String,
    show_value: bool,
    label: String,
}

#[derive(Template)]
#[template(
    source = r##"<svg xmlns="http://www.w3.org/2000/svg" x="{{ offset_x }}" y="0" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}" font-family="Helvetica, Arial, sans-serif">
<rect width="{{ width }}" height="{{ height }}" fill="{{ background }}"/>
<text x="{{ center_x }}" y="28" text-anchor="middle" font-size="16" font-weight="bold" fill="{{ foreground }}">{{ title }}</text>
{% for slice in slices %}<path d="{{ slice.path }}" fill="{{ slice.color }}" stroke="{{ background }}" stroke-width="1.5"/>
<text x="{{ slice.label_x }}" y="{{ slice.label_y }}" text-anchor="middle" font-size="11" fill="{{ foreground }}">{{ slice.percent }}</text>
<rect x="{{ legend_x }}" y="{{ slice.legend_y }}" width="12" height="12" fill="{{ slice.color }}"/>
<text x="{{ legend_text_x }}" y="{{ slice.legend_y }}" dy="10" font-size="11" fill="{{ foreground }}">{{ slice.name }}</text>
{% endfor %}{% if slices.is_empty() %}<text x="{{ center_x }}" y="{{ cy }}" text-anchor="middle" font-size="13" fill="{{ foreground }}">No skills detected</text>
{% endif %}</svg>"##,
    ext = "svg"
)]
struct PieChartTemplate {
    offset_x: f32,
    width: f32,
    height: f32,
    center_x: f32,
    cy: f32,
    title: String,
    background: &'static str,
    foreground: &'static str,
    legend_x: f32,
    legend_text_x: f32,
    slices: Vec<Slice>,
}

struct Slice {
    path: String,
    color: &'static str,
    label_x: f32,
    label_y: f32,
    percent: String,
    name: String,
    legend_y: f32,
}

#[derive(Template)]
#[template(
    source = r##"<svg xmlns="http://www.w3.org/2000/svg" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}">
{{ left|safe }}
{{ right|safe }}
</svg>"##,
    ext = "svg"
)]
struct SummaryTemplate<'a> {
    width: f32,
    height: f32,
    left: &'a str,
    right: &'a str,
}

/// A rendered chart and the file name it is saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub file_name: String,
    pub svg: String,
}

/// Renders the score, skill distribution, summary and per-candidate charts.
#[derive(Debug, Clone)]
pub struct ChartEmitter {
    width: f32,
    height: f32,
}

impl Default for ChartEmitter {
    fn default() -> Self {
        Self::new(640.0, 420.0)
    }
}

impl ChartEmitter {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Bar chart of candidate scores on a 0-100 axis.
    pub fn score_chart(&self, report: &AnalysisReport) -> Result<String> {
        self.bar_chart(
            "Candidate Match Scores",
            "Match Score (%)",
            &score_values(report),
            100.0,
            20.0,
            true,
            0.0,
        )
    }

    /// Pie chart of how many candidates list each skill.
    pub fn skill_chart(&self, report: &AnalysisReport) -> Result<String> {
        self.pie_chart("Skill Distribution", report, 0.0)
    }

    /// Score and skill charts side by side.
    pub fn summary_chart(&self, report: &AnalysisReport) -> Result<String> {
        let left = self.bar_chart(
            "Candidate Match Scores",
            "Match Score (%)",
            &score_values(report),
            100.0,
            20.0,
            true,
            0.0,
        )?;
        let right = self.pie_chart("Skill Distribution", report, self.width)?;

        SummaryTemplate {
            width: self.width * 2.0,
            height: self.height,
            left: &left,
            right: &right,
        }
        .render()
        .map_err(|e| CvRankerError::emitter("svg", e))
    }

    /// Presence bars for one candidate's top skills.
    pub fn candidate_chart(&self, row: &ReportRow) -> Result<String> {
        let color = palette_color(row.rank.saturating_sub(1));
        let values: Vec<(String, f32, &'static str)> =
            row.top_skills.iter().map(|skill| (skill.clone(), 1.0, color)).collect();

        self.bar_chart(
            &format!("{} - Score: {}%", row.candidate, format_score(row.score)),
            "Skill Presence",
            &values,
            2.0,
            1.0,
            false,
            0.0,
        )
    }

    pub fn render_all(&self, report: &AnalysisReport) -> Result<Vec<RenderedChart>> {
        let mut charts = vec![
            RenderedChart {
                file_name: "summary.svg".to_string(),
                svg: self.summary_chart(report)?,
            },
            RenderedChart {
                file_name: "scores.svg".to_string(),
                svg: self.score_chart(report)?,
            },
            RenderedChart {
                file_name: "skills.svg".to_string(),
                svg: self.skill_chart(report)?,
            },
        ];

        for row in &report.rows {
            charts.push(RenderedChart {
                file_name: format!("candidate_{:02}_{}.svg", row.rank, file_stem(&row.candidate)),
                svg: self.candidate_chart(row)?,
            });
        }

        Ok(charts)
    }

    /// Render every chart into `dir`, returning the written paths.
    pub fn save_all(&self, report: &AnalysisReport, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for chart in self.render_all(report)? {
            let path = dir.join(&chart.file_name);
            std::fs::write(&path, chart.svg)?;
            debug!("Wrote chart {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    #[allow(clippy::too_many_arguments)]
    fn bar_chart(
        &self,
        title: &str,
        y_label: &str,
        values: &[(String, f32, &'static str)],
        y_max: f32,
        tick_step: f32,
        show_values: bool,
        offset_x: f32,
    ) -> Result<String> {
        let plot_left = 70.0;
        let plot_right = self.width - 20.0;
        let plot_top = 50.0;
        let plot_bottom = self.height - 120.0;
        let plot_height = plot_bottom - plot_top;

        let y_for = |value: f32| plot_bottom - value.clamp(0.0, y_max) / y_max * plot_height;

        let tick_count = (y_max / tick_step).round() as usize;
        let ticks = (0..=tick_count)
            .map(|i| {
                let value = i as f32 * tick_step;
                Tick {
                    y: round1(y_for(value)),
                    label: format_score(value),
                }
            })
            .collect();

        let slot = if values.is_empty() {
            0.0
        } else {
            (plot_right - plot_left) / values.len() as f32
        };
        let bar_width = slot * 0.6;

        let bars = values
            .iter()
            .enumerate()
            .map(|(i, (label, value, color))| {
                let center_x = plot_left + slot * (i as f32 + 0.5);
                let top = y_for(*value);
                Bar {
                    x: round1(center_x - bar_width / 2.0),
                    y: round1(top),
                    width: round1(bar_width),
                    height: round1(plot_bottom - top),
                    center_x: round1(center_x),
                    value_y: round1(top - 6.0),
                    color,
                    value: format!("{}%", format_score(*value)),
                    show_value: show_values,
                    label: truncate_text(label, LABEL_LEN),
                }
            })
            .collect();

        BarChartTemplate {
            offset_x,
            width: self.width,
            height: self.height,
            center_x: self.width / 2.0,
            title: title.to_string(),
            y_label: y_label.to_string(),
            background: BACKGROUND,
            foreground: FOREGROUND,
            grid: GRID,
            plot_left,
            plot_right,
            plot_bottom,
            axis_mid_y: round1((plot_top + plot_bottom) / 2.0),
            tick_x: plot_left - 8.0,
            label_y: plot_bottom + 16.0,
            ticks,
            bars,
        }
        .render()
        .map_err(|e| CvRankerError::emitter("svg", e))
    }

    fn pie_chart(&self, title: &str, report: &AnalysisReport, offset_x: f32) -> Result<String> {
        let cx = self.width * 0.35;
        let cy = self.height / 2.0 + 15.0;
        let radius = (self.height / 2.0 - 60.0).min(self.width * 0.3);

        let total: usize = report.skill_frequency.iter().map(|f| f.count).sum();
        let mut slices = Vec::with_capacity(report.skill_frequency.len());
        let mut start = -PI / 2.0;

        for (i, frequency) in report.skill_frequency.iter().enumerate() {
            let fraction = frequency.count as f32 / total as f32;
            let sweep = fraction * 2.0 * PI;
            let end = start + sweep;
            let mid = start + sweep / 2.0;

            slices.push(Slice {
                path: slice_path(cx, cy, radius, start, end, fraction),
                color: palette_color(i),
                label_x: round1(cx + radius * 0.65 * mid.cos()),
                label_y: round1(cy + radius * 0.65 * mid.sin() + 4.0),
                percent: format!("{:.1}%", fraction * 100.0),
                name: frequency.skill.clone(),
                legend_y: 60.0 + i as f32 * 18.0,
            });
            start = end;
        }

        PieChartTemplate {
            offset_x,
            width: self.width,
            height: self.height,
            center_x: self.width / 2.0,
            cy,
            title: title.to_string(),
            background: BACKGROUND,
            foreground: FOREGROUND,
            legend_x: self.width * 0.72,
            legend_text_x: self.width * 0.72 + 18.0,
            slices,
        }
        .render()
        .map_err(|e| CvRankerError::emitter("svg", e))
    }
}

fn score_values(report: &AnalysisReport) -> Vec<(String, f32, &'static str)> {
    report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.candidate.clone(), row.score, palette_color(i)))
        .collect()
}

fn slice_path(cx: f32, cy: f32, r: f32, start: f32, end: f32, fraction: f32) -> String {
    // A single arc cannot draw a full circle.
    if fraction >= 0.9999 {
        return format!(
            "M {:.1} {:.1} A {r:.1} {r:.1} 0 1 1 {:.1} {:.1} A {r:.1} {r:.1} 0 1 1 {:.1} {:.1} Z",
            cx,
            cy - r,
            cx,
            cy + r,
            cx,
            cy - r,
            r = r
        );
    }

    let large_arc = if fraction > 0.5 { 1 } else { 0 };
    format!(
        "M {:.1} {:.1} L {:.1} {:.1} A {r:.1} {r:.1} 0 {} 1 {:.1} {:.1} Z",
        cx,
        cy,
        cx + r * start.cos(),
        cy + r * start.sin(),
        large_arc,
        cx + r * end.cos(),
        cy + r * end.sin(),
        r = r
    )
}

fn file_stem(candidate: &str) -> String {
    let stem = Path::new(candidate)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "candidate".to_string()
    } else {
        cleaned
    }
}
