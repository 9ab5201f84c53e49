//! CV ranker: rank CV files against job requirements

use clap::Parser;
use cv_ranker::cli::{self, Cli, Commands, ConfigAction, RankArgs};
use cv_ranker::config::{Config, OutputFormat, SemanticBackend};
use cv_ranker::error::{CvRankerError, EmptyInputKind, Result};
use cv_ranker::input::InputManager;
use cv_ranker::output::formatter::{save_report_to_file, suggest_filename};
use cv_ranker::output::{AnalysisReport, ChartEmitter, ReportGenerator};
use cv_ranker::processing::analyzer::{run_until_interrupted, AnalysisEngine, CancelToken};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Rank(args) => run_rank(args, config).await,

        Commands::Skills => {
            println!("Skill vocabulary ({} keywords)\n", config.skills.vocabulary.len());
            for skill in &config.skills.vocabulary {
                println!("  • {}", skill);
            }
            Ok(())
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    let content = toml::to_string_pretty(&config)
                        .map_err(|e| CvRankerError::Configuration(e.to_string()))?;
                    println!("# {}\n", path.display());
                    println!("{}", content);
                }
                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset to defaults: {}", path.display());
                }
                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
            Ok(())
        }
    }
}

async fn run_rank(args: RankArgs, mut config: Config) -> Result<()> {
    let output_format = cli::resolve_output_format(
        args.format.as_deref(),
        args.save.as_deref(),
        config.output.format,
    )
    .map_err(CvRankerError::InvalidInput)?;

    let strategy = match args.strategy.as_deref() {
        Some(strategy) => cli::parse_strategy(strategy).map_err(CvRankerError::InvalidInput)?,
        None => config.scoring.strategy,
    };

    if args.lexical {
        config.scoring.semantic_backend = SemanticBackend::Lexical;
    }
    if let Some(top_n) = args.top_skills {
        config.skills.top_n = top_n;
    }
    if args.no_progress {
        config.processing.show_progress = false;
    }
    config.validate()?;

    let job_requirements = match (&args.job, &args.requirements) {
        (Some(path), _) => InputManager::new().extract_text(path).await?,
        (None, Some(text)) => text.clone(),
        (None, None) => return Err(CvRankerError::EmptyInput(EmptyInputKind::NoRequirements)),
    };

    info!("Ranking {} file(s) with the {} strategy", args.files.len(), strategy);

    let cancel = CancelToken::new();
    let mut engine = AnalysisEngine::new(&config).await?.with_strategy(strategy);
    let outcome = run_until_interrupted(
        engine.analyze(&args.files, &job_requirements, &cancel),
        &cancel,
        wait_for_signal,
    )
    .await?;

    let report = AnalysisReport::from_outcome(&outcome, &job_requirements, config.skills.top_n);
    let rendered = ReportGenerator::from_config(&config.output).generate_report(&report, output_format)?;

    // Stdout carries only the report; status lines go to stderr.
    match (&args.save, output_format) {
        (Some(path), _) => {
            save_report_to_file(&rendered, path)?;
            eprintln!("Report saved to {}", path.display());
        }
        // Binary formats never go to stdout.
        (None, OutputFormat::Pdf | OutputFormat::Docx) => {
            let path = PathBuf::from(suggest_filename(output_format, true));
            save_report_to_file(&rendered, &path)?;
            eprintln!("Report saved to {}", path.display());
        }
        (None, _) => print!("{}", String::from_utf8_lossy(&rendered)),
    }

    if let Some(dir) = &args.charts {
        let written = ChartEmitter::default().save_all(&report, dir)?;
        eprintln!("Wrote {} chart(s) to {}", written.len(), dir.display());
    }

    if args.save.is_some() || output_format != OutputFormat::Console {
        eprintln!("{}", report.best_candidate_line());
        if report.failed_count > 0 {
            eprintln!("{} file(s) could not be read and were skipped", report.failed_count);
        }
    }

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
