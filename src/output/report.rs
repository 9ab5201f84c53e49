//! Report data assembled from an analysis outcome

use crate::processing::analyzer::AnalysisOutcome;
use crate::processing::ranker::SkillFrequency;
use crate::processing::scorer::ScoringStrategy;
use crate::processing::text_processor::truncate_text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything an emitter needs; emitters never look at the raw outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    /// Number of CVs that were analyzed and ranked
    pub total_analyzed: usize,
    /// Number of files excluded because extraction failed
    pub failed_count: usize,
    pub best_candidate: Option<BestCandidate>,
    pub rows: Vec<ReportRow>,
    pub skill_frequency: Vec<SkillFrequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub ranker_version: String,
    pub strategy: ScoringStrategy,
    pub semantic_backend: String,
    pub job_requirements_preview: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestCandidate {
    pub candidate: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub rank: usize,
    pub candidate: String,
    pub score: f32,
    pub top_skills: Vec<String>,
    pub best_fit: bool,
}

const REQUIREMENTS_PREVIEW_LEN: usize = 160;

impl AnalysisReport {
    pub fn from_outcome(outcome: &AnalysisOutcome, job_requirements: &str, top_n: usize) -> Self {
        let best_candidate = outcome.ranked.best().map(|best| BestCandidate {
            candidate: best.id.clone(),
            score: best.score,
        });

        let rows = outcome
            .ranked
            .iter()
            .enumerate()
            .map(|(index, candidate)| ReportRow {
                rank: index + 1,
                candidate: candidate.id.clone(),
                score: candidate.score,
                top_skills: candidate.top_skills(top_n).to_vec(),
                best_fit: index == 0,
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                ranker_version: env!("CARGO_PKG_VERSION").to_string(),
                strategy: outcome.strategy,
                semantic_backend: outcome.semantic_backend.clone(),
                job_requirements_preview: truncate_text(job_requirements.trim(), REQUIREMENTS_PREVIEW_LEN),
                processing_time_ms: outcome.processing_time_ms,
            },
            total_analyzed: outcome.analyzed_count(),
            failed_count: outcome.failed_count,
            best_candidate,
            rows,
            skill_frequency: outcome.ranked.skill_frequency(),
        }
    }

    /// One-line best candidate summary shared by all formats.
    pub fn best_candidate_line(&self) -> String {
        match &self.best_candidate {
            Some(best) => format!("Best Candidate: {} (Score: {}%)", best.candidate, format_score(best.score)),
            None => "Best Candidate: none".to_string(),
        }
    }

    pub fn generated_at_display(&self) -> String {
        self.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// Scores are stored rounded to two decimals; trailing zeros are dropped.
pub fn format_score(score: f32) -> String {
    let text = format!("{:.2}", score);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn format_skills(skills: &[String]) -> String {
    skills.join(", ")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::processing::document::ScoredCandidate;
    use crate::processing::ranker;

    pub fn sample_outcome() -> AnalysisOutcome {
        let scored = vec![
            ScoredCandidate {
                id: "bob_marketing.docx".to_string(),
                score: 21.5,
                skills: vec!["communication".to_string()],
            },
            ScoredCandidate {
                id: "alice_engineer.pdf".to_string(),
                score: 78.25,
                skills: vec![
                    "python".to_string(),
                    "aws".to_string(),
                    "docker".to_string(),
                    "sql".to_string(),
                    "kubernetes".to_string(),
                    "devops".to_string(),
                ],
            },
            ScoredCandidate {
                id: "carol.txt".to_string(),
                score: 40.0,
                skills: vec!["python".to_string(), "communication".to_string()],
            },
        ];

        AnalysisOutcome {
            ranked: ranker::rank(scored),
            failed_count: 1,
            strategy: ScoringStrategy::Blended,
            semantic_backend: "lexical".to_string(),
            processing_time_ms: 12,
        }
    }

    pub fn sample_report() -> AnalysisReport {
        AnalysisReport::from_outcome(&sample_outcome(), "Python developer with AWS and Docker experience", 5)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_report;
    use super::*;

    #[test]
    fn test_rows_follow_ranking() {
        let report = sample_report();

        assert_eq!(report.total_analyzed, 3);
        assert_eq!(report.failed_count, 1);
        let names: Vec<&str> = report.rows.iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(names, vec!["alice_engineer.pdf", "carol.txt", "bob_marketing.docx"]);
        assert_eq!(report.rows[0].rank, 1);
        assert!(report.rows[0].best_fit);
        assert!(!report.rows[1].best_fit);
    }

    #[test]
    fn test_top_skills_truncated() {
        let report = sample_report();
        assert_eq!(report.rows[0].top_skills.len(), 5);
        assert!(!report.rows[0].top_skills.contains(&"devops".to_string()));
    }

    #[test]
    fn test_best_candidate_line() {
        let report = sample_report();
        assert_eq!(report.best_candidate_line(), "Best Candidate: alice_engineer.pdf (Score: 78.25%)");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(78.25), "78.25");
        assert_eq!(format_score(40.0), "40");
        assert_eq!(format_score(21.5), "21.5");
        assert_eq!(format_score(0.0), "0");
    }
}
