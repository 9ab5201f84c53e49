//! Candidate and job requirement data structures

use crate::error::{CvRankerError, EmptyInputKind, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw text of one uploaded CV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDocument {
    /// Display name, the final segment of the source path
    pub id: String,
    pub text: String,
}

impl CandidateDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn from_path(path: &Path, text: String) -> Self {
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self { id, text }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Free-text job requirements for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequirements(String);

impl JobRequirements {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CvRankerError::EmptyInput(EmptyInputKind::NoRequirements));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Lowercased whitespace-separated words, duplicates kept.
    pub fn words(&self) -> Vec<String> {
        self.0.split_whitespace().map(|w| w.to_lowercase()).collect()
    }
}

/// Score and detected skills for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    /// Match score in [0, 100]
    pub score: f32,
    /// Detected skills, deduplicated, in discovery order
    pub skills: Vec<String>,
}

impl ScoredCandidate {
    pub fn top_skills(&self, n: usize) -> &[String] {
        &self.skills[..self.skills.len().min(n)]
    }
}
