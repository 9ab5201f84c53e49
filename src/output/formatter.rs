//! Report emitters: console, JSON, Markdown, HTML, PDF and DOCX

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{CvRankerError, Result};
use crate::output::charts::ChartEmitter;
use crate::output::report::{format_score, format_skills, AnalysisReport};
use crate::processing::text_processor::truncate_text;
use askama::Template;
use colored::{Color, Colorize};
use std::io::{Cursor, Write};
use std::path::Path;

/// Turns an [`AnalysisReport`] into the bytes of one output format.
pub trait ReportEmitter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>>;
    fn format(&self) -> OutputFormat;
}

/// Colored terminal table
pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Standalone HTML page, optionally with the summary chart inlined
pub struct HtmlFormatter {
    include_charts: bool,
}

/// Fixed-layout A4 report
pub struct PdfFormatter;

/// Flow document with a results table
pub struct DocxFormatter;

/// Dispatches a report to the emitter for a given format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
    pdf_formatter: PdfFormatter,
    docx_formatter: DocxFormatter,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CV Analysis Report</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #F5F6FA;
            max-width: 1000px;
            margin: 0 auto;
            padding: 20px;
            background: #1A1A2E;
        }
        .container {
            background: #16213E;
            padding: 30px;
            border-radius: 8px;
        }
        .header {
            text-align: center;
            border-bottom: 3px solid #0E6CFF;
            padding-bottom: 15px;
        }
        .summary {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 15px;
            margin: 20px 0;
        }
        .summary-item {
            background: #1F2B4D;
            padding: 15px;
            border-radius: 6px;
            border-left: 4px solid #0E6CFF;
        }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { padding: 10px; border-bottom: 1px solid #3A4466; text-align: left; }
        th { background: #0E6CFF; }
        tr.best { background: #1E4D2B; }
        .badge {
            background: #28A745;
            padding: 2px 10px;
            border-radius: 12px;
            font-size: 0.85em;
        }
        .chart { margin: 20px 0; overflow-x: auto; }
        .metadata { font-size: 0.9em; color: #A0A6BA; margin-top: 30px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>CV Analysis Report</h1>
            <p>Generated: {{ generated_at }} | Processing time: {{ processing_time }}ms</p>
        </div>

        <div class="summary">
            <div class="summary-item"><h4>Analyzed</h4><p><strong>{{ total_analyzed }}</strong> CV(s)</p></div>
            <div class="summary-item"><h4>Failed</h4><p><strong>{{ failed_count }}</strong> file(s)</p></div>
            <div class="summary-item"><h4>Best Candidate</h4><p><strong>{{ best_candidate }}</strong></p></div>
        </div>

        <p><strong>Job requirements:</strong> {{ requirements }}</p>

        <table>
            <thead>
                <tr><th>Rank</th><th>Candidate</th><th>Score</th><th>Top Skills</th><th>Best Fit</th></tr>
            </thead>
            <tbody>
            {% for row in rows %}
                <tr{% if row.best_fit %} class="best"{% endif %}>
                    <td>{{ row.rank }}</td>
                    <td>{{ row.candidate }}</td>
                    <td>{{ row.score }}%</td>
                    <td>{{ row.skills }}</td>
                    <td>{% if row.best_fit %}<span class="badge">Best</span>{% endif %}</td>
                </tr>
            {% endfor %}
            </tbody>
        </table>

        {% if has_chart %}
        <div class="chart">
            {{ chart_svg|safe }}
        </div>
        {% endif %}

        <div class="metadata">
            <p>Generated by CV Ranker v{{ version }} | Strategy: {{ strategy }} | Similarity: {{ semantic_backend }}</p>
        </div>
    </div>
</body>
</html>"#,
    ext = "html"
)]
struct HtmlTemplate {
    generated_at: String,
    processing_time: u64,
    total_analyzed: usize,
    failed_count: usize,
    best_candidate: String,
    requirements: String,
    rows: Vec<HtmlRow>,
    has_chart: bool,
    chart_svg: String,
    version: String,
    strategy: String,
    semantic_backend: String,
}

struct HtmlRow {
    rank: usize,
    candidate: String,
    score: String,
    skills: String,
    best_fit: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn score_color(score: f32) -> Color {
        match score {
            s if s >= 75.0 => Color::Green,
            s if s >= 50.0 => Color::Yellow,
            s if s >= 25.0 => Color::BrightYellow,
            _ => Color::Red,
        }
    }
}

impl ReportEmitter for ConsoleFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        let mut output = String::new();

        output.push_str(&self.format_header("CV RANKING"));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.generated_at_display(),
            report.metadata.processing_time_ms
        ));
        output.push_str(&format!(
            "Job: {}\n",
            self.colorize(&report.metadata.job_requirements_preview, Color::Cyan)
        ));

        output.push_str(&self.format_header("Results"));
        output.push_str(&format!("{:<5} {:<32} {:>8}  {}\n", "Rank", "Candidate", "Score", "Top Skills"));
        output.push_str(&format!("{}\n", "-".repeat(72)));

        for row in &report.rows {
            let score = format!("{:>7}%", format_score(row.score));
            let candidate = format!("{:<32}", truncate_text(&row.candidate, 32));
            let best = if row.best_fit {
                format!(" {}", self.colorize("[BEST]", Color::Green))
            } else {
                String::new()
            };

            output.push_str(&format!(
                "{:<5} {} {}  {}{}\n",
                row.rank,
                candidate,
                self.colorize(&score, Self::score_color(row.score)),
                format_skills(&row.top_skills),
                best
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "{}\n",
            self.colorize(&report.best_candidate_line(), Color::Green)
        ));
        output.push_str(&format!(
            "Analyzed: {} | Failed: {}\n",
            report.total_analyzed, report.failed_count
        ));

        if report.failed_count > 0 {
            output.push_str(&format!(
                "{}\n",
                self.colorize(
                    &format!("{} file(s) could not be read and were skipped", report.failed_count),
                    Color::Yellow
                )
            ));
        }

        output.push_str(&format!(
            "\nCV Ranker v{} | Strategy: {} | Similarity: {}\n",
            report.metadata.ranker_version, report.metadata.strategy, report.metadata.semantic_backend
        ));

        Ok(output.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn write_to<W: Write>(&self, report: &AnalysisReport, writer: W) -> Result<()> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(writer, report)
        } else {
            serde_json::to_writer(writer, report)
        };
        written.map_err(|e| CvRankerError::emitter(OutputFormat::Json, e))
    }
}

impl ReportEmitter for JsonFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(report, &mut buffer)?;
        Ok(buffer)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl ReportEmitter for MarkdownFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        let mut output = String::new();

        output.push_str("# CV Analysis Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n\n",
                report.generated_at_display(),
                report.metadata.processing_time_ms
            ));
        }

        output.push_str(&format!(
            "**Job requirements:** {}\n\n",
            report.metadata.job_requirements_preview
        ));
        output.push_str(&format!("**{}**\n\n", report.best_candidate_line()));
        output.push_str(&format!(
            "Analyzed: {} | Failed: {}\n\n",
            report.total_analyzed, report.failed_count
        ));

        output.push_str("## Results\n\n");
        output.push_str("| Rank | Candidate | Score | Top Skills | Best Fit |\n");
        output.push_str("|------|-----------|-------|------------|----------|\n");
        for row in &report.rows {
            output.push_str(&format!(
                "| {} | {} | {}% | {} | {} |\n",
                row.rank,
                Self::escape_cell(&row.candidate),
                format_score(row.score),
                Self::escape_cell(&format_skills(&row.top_skills)),
                if row.best_fit { "Best" } else { "" }
            ));
        }
        output.push('\n');

        if !report.skill_frequency.is_empty() {
            output.push_str("## Skill Distribution\n\n");
            for frequency in &report.skill_frequency {
                output.push_str(&format!("- {}: {}\n", frequency.skill, frequency.count));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by CV Ranker v{} using the {} strategy ({} similarity)*\n",
                report.metadata.ranker_version, report.metadata.strategy, report.metadata.semantic_backend
            ));
        }

        Ok(output.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_charts: bool) -> Self {
        Self { include_charts }
    }

    fn create_template_data(&self, report: &AnalysisReport) -> Result<HtmlTemplate> {
        let chart_svg = if self.include_charts && !report.rows.is_empty() {
            ChartEmitter::default().summary_chart(report)?
        } else {
            String::new()
        };

        let best_candidate = match &report.best_candidate {
            Some(best) => format!("{} ({}%)", best.candidate, format_score(best.score)),
            None => "none".to_string(),
        };

        Ok(HtmlTemplate {
            generated_at: report.generated_at_display(),
            processing_time: report.metadata.processing_time_ms,
            total_analyzed: report.total_analyzed,
            failed_count: report.failed_count,
            best_candidate,
            requirements: report.metadata.job_requirements_preview.clone(),
            rows: report
                .rows
                .iter()
                .map(|row| HtmlRow {
                    rank: row.rank,
                    candidate: row.candidate.clone(),
                    score: format_score(row.score),
                    skills: format_skills(&row.top_skills),
                    best_fit: row.best_fit,
                })
                .collect(),
            has_chart: !chart_svg.is_empty(),
            chart_svg,
            version: report.metadata.ranker_version.clone(),
            strategy: report.metadata.strategy.to_string(),
            semantic_backend: report.metadata.semantic_backend.clone(),
        })
    }
}

impl ReportEmitter for HtmlFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        let template_data = self.create_template_data(report)?;
        let html = template_data
            .render()
            .map_err(|e| CvRankerError::emitter(OutputFormat::Html, e))?;
        Ok(html.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl PdfFormatter {
    const PAGE_WIDTH: f32 = 210.0;
    const PAGE_HEIGHT: f32 = 297.0;
    const MARGIN: f32 = 20.0;
    const ROW_HEIGHT: f32 = 8.0;
    const COLUMNS: [(&'static str, f32); 4] = [("Rank", 20.0), ("Candidate", 34.0), ("Score", 104.0), ("Top Skills", 126.0)];

    pub fn new() -> Self {
        Self
    }

    fn rule(layer: &printpdf::PdfLayerReference, y: f32) {
        use printpdf::{Line, Mm, Point};

        let line = Line {
            points: vec![
                (Point::new(Mm(Self::MARGIN), Mm(y)), false),
                (Point::new(Mm(Self::PAGE_WIDTH - Self::MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        };
        layer.set_outline_thickness(0.5);
        layer.add_line(line);
    }
}

impl Default for PdfFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEmitter for PdfFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        use printpdf::{BuiltinFont, Mm, PdfDocument};

        let to_error = |e: printpdf::Error| CvRankerError::emitter(OutputFormat::Pdf, e);

        let (doc, page, layer) = PdfDocument::new(
            "CV Analysis Report",
            Mm(Self::PAGE_WIDTH),
            Mm(Self::PAGE_HEIGHT),
            "Layer 1",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(to_error)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(to_error)?;

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = Self::PAGE_HEIGHT - Self::MARGIN;

        current.use_text("CV Analysis Report", 18.0, Mm(Self::MARGIN), Mm(y), &bold);
        y -= 10.0;
        current.use_text(
            format!("Generated: {}", report.generated_at_display()),
            10.0,
            Mm(Self::MARGIN),
            Mm(y),
            &regular,
        );
        y -= 6.0;
        current.use_text(
            format!(
                "Analyzed: {} | Failed: {} | Strategy: {}",
                report.total_analyzed, report.failed_count, report.metadata.strategy
            ),
            10.0,
            Mm(Self::MARGIN),
            Mm(y),
            &regular,
        );
        y -= 6.0;
        current.use_text(
            format!("Job: {}", truncate_text(&report.metadata.job_requirements_preview, 90)),
            10.0,
            Mm(Self::MARGIN),
            Mm(y),
            &regular,
        );
        y -= 8.0;
        current.use_text(report.best_candidate_line(), 12.0, Mm(Self::MARGIN), Mm(y), &bold);
        y -= 12.0;

        let header = |layer: &printpdf::PdfLayerReference, y: f32| {
            for (title, x) in Self::COLUMNS {
                layer.use_text(title, 11.0, Mm(x), Mm(y), &bold);
            }
            Self::rule(layer, y - 2.5);
        };

        header(&current, y);
        y -= Self::ROW_HEIGHT;

        for row in &report.rows {
            if y < Self::MARGIN {
                let (next_page, next_layer) = doc.add_page(Mm(Self::PAGE_WIDTH), Mm(Self::PAGE_HEIGHT), "Layer 1");
                current = doc.get_page(next_page).get_layer(next_layer);
                y = Self::PAGE_HEIGHT - Self::MARGIN;
                header(&current, y);
                y -= Self::ROW_HEIGHT;
            }

            let font = if row.best_fit { &bold } else { &regular };
            let cells = [
                row.rank.to_string(),
                truncate_text(&row.candidate, 32),
                format!("{}%", format_score(row.score)),
                truncate_text(&format_skills(&row.top_skills), 40),
            ];
            for ((_, x), text) in Self::COLUMNS.iter().zip(cells) {
                current.use_text(text, 10.0, Mm(*x), Mm(y), font);
            }
            y -= Self::ROW_HEIGHT;
        }

        doc.save_to_bytes().map_err(to_error)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }
}

impl DocxFormatter {
    pub fn new() -> Self {
        Self
    }

    fn text_paragraph(text: &str, bold: bool, size: usize) -> docx_rs::Paragraph {
        let mut run = docx_rs::Run::new().add_text(text).size(size);
        if bold {
            run = run.bold();
        }
        docx_rs::Paragraph::new().add_run(run)
    }

    fn cell(text: &str, bold: bool) -> docx_rs::TableCell {
        docx_rs::TableCell::new().add_paragraph(Self::text_paragraph(text, bold, 20))
    }
}

impl Default for DocxFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEmitter for DocxFormatter {
    fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        use docx_rs::{AlignmentType, Docx, Table, TableRow};

        let mut rows = vec![TableRow::new(
            ["Rank", "Candidate", "Score", "Top Skills", "Best Fit"]
                .iter()
                .map(|title| Self::cell(title, true))
                .collect(),
        )];
        for row in &report.rows {
            rows.push(TableRow::new(vec![
                Self::cell(&row.rank.to_string(), false),
                Self::cell(&row.candidate, row.best_fit),
                Self::cell(&format!("{}%", format_score(row.score)), false),
                Self::cell(&format_skills(&row.top_skills), false),
                Self::cell(if row.best_fit { "Best" } else { "" }, false),
            ]));
        }

        let docx = Docx::new()
            .add_paragraph(Self::text_paragraph("CV Analysis Report", true, 36).align(AlignmentType::Center))
            .add_paragraph(Self::text_paragraph(
                &format!("Generated: {}", report.generated_at_display()),
                false,
                20,
            ))
            .add_paragraph(Self::text_paragraph(
                &format!("Job requirements: {}", report.metadata.job_requirements_preview),
                false,
                22,
            ))
            .add_paragraph(Self::text_paragraph(
                &format!(
                    "Analyzed: {} | Failed: {} | Strategy: {}",
                    report.total_analyzed, report.failed_count, report.metadata.strategy
                ),
                false,
                22,
            ))
            .add_paragraph(Self::text_paragraph(&report.best_candidate_line(), true, 24))
            .add_table(Table::new(rows));

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| CvRankerError::emitter(OutputFormat::Docx, e))?;
        Ok(buffer.into_inner())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool, include_html_charts: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_charts),
            pdf_formatter: PdfFormatter::new(),
            docx_formatter: DocxFormatter::new(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::with_options(config.color_output, config.pretty_json, true, true)
    }

    pub fn emitter(&self, format: OutputFormat) -> &dyn ReportEmitter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Html => &self.html_formatter,
            OutputFormat::Pdf => &self.pdf_formatter,
            OutputFormat::Docx => &self.docx_formatter,
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: OutputFormat) -> Result<Vec<u8>> {
        self.emitter(format).render(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// Infer an output format from a file suffix.
pub fn format_from_path(path: &Path) -> Option<OutputFormat> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "txt" => Some(OutputFormat::Console),
        "json" => Some(OutputFormat::Json),
        "md" | "markdown" => Some(OutputFormat::Markdown),
        "html" | "htm" => Some(OutputFormat::Html),
        "pdf" => Some(OutputFormat::Pdf),
        "docx" => Some(OutputFormat::Docx),
        _ => None,
    }
}

pub fn suggest_filename(format: OutputFormat, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
        OutputFormat::Pdf => "pdf",
        OutputFormat::Docx => "docx",
    };
    format!("cv_ranking{}.{}", timestamp_suffix, extension)
}
