//! Error handling for the CV ranker

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvRankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("Failed to extract text from '{path}': {reason}")]
    Extraction { path: String, reason: String },

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Missing input: {0}")]
    EmptyInput(EmptyInputKind),

    #[error("No valid CVs were processed ({attempted} file(s) failed extraction)")]
    NoResults { attempted: usize },

    #[error("Failed to generate {format} output: {reason}")]
    Emitter { format: String, reason: String },

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

/// Which precondition of an analysis run was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyInputKind {
    NoFiles,
    NoRequirements,
}

impl fmt::Display for EmptyInputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyInputKind::NoFiles => write!(f, "please provide CV files before analyzing"),
            EmptyInputKind::NoRequirements => write!(f, "please provide job requirements"),
        }
    }
}

impl CvRankerError {
    /// Build an emitter failure tagged with the output format that produced it.
    pub fn emitter(format: impl fmt::Display, reason: impl fmt::Display) -> Self {
        CvRankerError::Emitter {
            format: format.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that only exclude a single candidate from a batch.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            CvRankerError::Io(_)
                | CvRankerError::PdfExtraction(_)
                | CvRankerError::DocxExtraction(_)
                | CvRankerError::Extraction { .. }
                | CvRankerError::UnsupportedFormat(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CvRankerError>;

/// model2vec reports load failures as anyhow errors
impl From<anyhow::Error> for CvRankerError {
    fn from(err: anyhow::Error) -> Self {
        CvRankerError::ModelLoading(format!("Failed to load model: {:#}", err))
    }
}
