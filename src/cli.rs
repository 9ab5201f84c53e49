//! CLI interface for the CV ranker

use crate::config::OutputFormat;
use crate::output::formatter::format_from_path;
use crate::processing::scorer::ScoringStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cv-ranker")]
#[command(about = "Rank CVs against job requirements")]
#[command(long_about = "Score PDF, DOCX and plain-text CVs against a job description using semantic similarity and keyword overlap, then emit a ranked report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank CV files against job requirements
    Rank(RankArgs),

    /// List the skill vocabulary used for extraction
    Skills,

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
pub struct RankArgs {
    /// CV files (PDF, DOCX, TXT)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// File containing the job requirements
    #[arg(short, long, conflicts_with = "requirements", required_unless_present = "requirements")]
    pub job: Option<PathBuf>,

    /// Job requirements as inline text
    #[arg(short, long)]
    pub requirements: Option<String>,

    /// Output format: console, json, markdown, html, pdf, docx
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save the report to a file
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Write SVG charts into this directory
    #[arg(long)]
    pub charts: Option<PathBuf>,

    /// Scoring strategy: blended or corpus
    #[arg(long)]
    pub strategy: Option<String>,

    /// Use lexical similarity instead of the embedding model
    #[arg(long)]
    pub lexical: bool,

    /// Number of skills shown per candidate
    #[arg(long)]
    pub top_skills: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "pdf" => Ok(OutputFormat::Pdf),
        "docx" => Ok(OutputFormat::Docx),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html, pdf, docx",
            format
        )),
    }
}

pub fn parse_strategy(strategy: &str) -> Result<ScoringStrategy, String> {
    strategy.parse::<ScoringStrategy>().map_err(|e| e.to_string())
}

/// Pick the output format: an explicit flag wins, then the save path suffix,
/// then the configured default.
pub fn resolve_output_format(
    explicit: Option<&str>,
    save: Option<&Path>,
    default: OutputFormat,
) -> Result<OutputFormat, String> {
    if let Some(format) = explicit {
        return parse_output_format(format);
    }

    match save {
        Some(path) => format_from_path(path).ok_or_else(|| {
            format!(
                "Cannot infer a report format from {}; pass --format",
                path.display()
            )
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rank_arguments() {
        let cli = Cli::try_parse_from([
            "cv-ranker",
            "rank",
            "a.pdf",
            "b.docx",
            "--requirements",
            "Python developer",
            "--strategy",
            "corpus",
            "--top-skills",
            "3",
        ])
        .unwrap();

        let Commands::Rank(args) = cli.command else {
            panic!("expected rank command");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.requirements.as_deref(), Some("Python developer"));
        assert_eq!(args.top_skills, Some(3));
        assert_eq!(parse_strategy(args.strategy.as_deref().unwrap()), Ok(ScoringStrategy::Corpus));
    }

    #[test]
    fn test_rank_requires_job_source() {
        assert!(Cli::try_parse_from(["cv-ranker", "rank", "a.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "cv-ranker", "rank", "a.pdf", "--job", "job.txt", "--requirements", "x"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("DOCX"), Ok(OutputFormat::Docx));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("xlsx").is_err());
    }

    #[test]
    fn test_resolve_output_format() {
        let save = PathBuf::from("out/report.pdf");
        assert_eq!(
            resolve_output_format(None, Some(&save), OutputFormat::Console),
            Ok(OutputFormat::Pdf)
        );
        assert_eq!(
            resolve_output_format(Some("json"), Some(&save), OutputFormat::Console),
            Ok(OutputFormat::Json)
        );
        assert_eq!(
            resolve_output_format(None, None, OutputFormat::Markdown),
            Ok(OutputFormat::Markdown)
        );
        assert!(resolve_output_format(None, Some(Path::new("report.xyz")), OutputFormat::Console).is_err());
    }
}
