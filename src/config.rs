//! Configuration management for the CV ranker

use crate::error::{CvRankerError, Result};
use crate::processing::scorer::ScoringStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub skills: SkillsConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// HuggingFace repo id or local directory of a Model2Vec model
    pub embedding_model: String,
    pub models_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub strategy: ScoringStrategy,
    pub semantic_backend: SemanticBackend,
    pub semantic_scale: f32,
    pub keyword_scale: f32,
    pub max_score: f32,
    /// Corpus strategy only: drop terms found in more than this fraction of documents
    pub corpus_max_df: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticBackend {
    Model2vec,
    Lexical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    pub vocabulary: Vec<String>,
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub enable_caching: bool,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    Pdf,
    Docx,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Console => "console",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        };
        f.write_str(name)
    }
}

pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "sql",
    "machine learning",
    "data analysis",
    "project management",
    "communication",
    "leadership",
    "cloud computing",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "react",
    "angular",
    "node.js",
    "typescript",
    "devops",
    "agile",
    "scrum",
    "database management",
];

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cv-ranker")
            .join("models");

        Self {
            models: ModelConfig {
                embedding_model: "minishlab/potion-base-8M".to_string(),
                models_dir,
            },
            scoring: ScoringConfig {
                strategy: ScoringStrategy::Blended,
                semantic_backend: SemanticBackend::Model2vec,
                semantic_scale: 100.0,
                keyword_scale: 50.0,
                max_score: 100.0,
                corpus_max_df: 1.0,
            },
            skills: SkillsConfig {
                vocabulary: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
                top_n: 5,
            },
            processing: ProcessingConfig {
                enable_caching: true,
                show_progress: true,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                pretty_json: true,
            },
        }
    }
}

impl Config {
    /// Load the user config, writing the defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CvRankerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvRankerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-ranker")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        if scoring.semantic_scale <= 0.0 || scoring.keyword_scale <= 0.0 || scoring.max_score <= 0.0 {
            return Err(CvRankerError::Configuration(
                "scoring scales must be positive".to_string(),
            ));
        }
        if !(scoring.corpus_max_df > 0.0 && scoring.corpus_max_df <= 1.0) {
            return Err(CvRankerError::Configuration(
                "scoring.corpus_max_df must be in (0, 1]".to_string(),
            ));
        }
        if self.skills.vocabulary.iter().all(|s| s.trim().is_empty()) {
            return Err(CvRankerError::Configuration(
                "skills.vocabulary must contain at least one keyword".to_string(),
            ));
        }
        if self.skills.top_n == 0 {
            return Err(CvRankerError::Configuration(
                "skills.top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
