//! Candidate scoring strategies

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::processing::document::{CandidateDocument, JobRequirements, ScoredCandidate};
use crate::processing::embeddings::SemanticSimilarity;
use crate::processing::skills::SkillMatcher;
use crate::processing::term_vector::TermVectorSpace;
use crate::processing::text_processor::TextProcessor;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Semantic similarity plus keyword overlap, per candidate.
    Blended,
    /// Term-count cosine similarity in a vector space built from the whole batch.
    Corpus,
}

impl std::fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringStrategy::Blended => f.write_str("blended"),
            ScoringStrategy::Corpus => f.write_str("corpus"),
        }
    }
}

impl std::str::FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blended" => Ok(ScoringStrategy::Blended),
            "corpus" => Ok(ScoringStrategy::Corpus),
            _ => Err(format!("Invalid scoring strategy: {}. Supported: blended, corpus", s)),
        }
    }
}

pub struct ScoringEngine {
    strategy: ScoringStrategy,
    semantic: Box<dyn SemanticSimilarity>,
    skills: Arc<SkillMatcher>,
    processor: TextProcessor,
    semantic_scale: f32,
    keyword_scale: f32,
    max_score: f32,
    corpus_max_df: f32,
}

impl ScoringEngine {
    pub fn new(
        config: &ScoringConfig,
        semantic: Box<dyn SemanticSimilarity>,
        skills: Arc<SkillMatcher>,
    ) -> Self {
        Self {
            strategy: config.strategy,
            semantic,
            skills,
            processor: TextProcessor::new(),
            semantic_scale: config.semantic_scale,
            keyword_scale: config.keyword_scale,
            max_score: config.max_score,
            corpus_max_df: config.corpus_max_df,
        }
    }

    pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    pub fn semantic_backend(&self) -> &str {
        self.semantic.name()
    }

    /// Score a batch. Output order matches input order.
    pub fn score_all(
        &self,
        job: &JobRequirements,
        candidates: &[CandidateDocument],
    ) -> Result<Vec<ScoredCandidate>> {
        let scores = match self.strategy {
            ScoringStrategy::Blended => self.blended_scores(job, candidates)?,
            ScoringStrategy::Corpus => self.corpus_scores(job, candidates),
        };

        Ok(candidates
            .iter()
            .zip(scores)
            .map(|(candidate, score)| {
                let skills = self.skills.extract(&candidate.text);
                debug!("{}: score {:.2}, {} skill(s)", candidate.id, score, skills.len());
                ScoredCandidate {
                    id: candidate.id.clone(),
                    score,
                    skills,
                }
            })
            .collect())
    }

    fn blended_scores(&self, job: &JobRequirements, candidates: &[CandidateDocument]) -> Result<Vec<f32>> {
        let query = job.normalized();
        let texts: Vec<String> = candidates.iter().map(|c| c.text.to_lowercase()).collect();
        let similarities = self.semantic.similarities(&query, &texts)?;
        let words = job.words();

        Ok(texts
            .iter()
            .zip(similarities)
            .map(|(text, similarity)| {
                let similarity = if similarity.is_finite() {
                    similarity.clamp(0.0, 1.0)
                } else {
                    warn!("{} similarity returned {}, treating it as 0", self.semantic.name(), similarity);
                    0.0
                };
                let semantic = similarity * self.semantic_scale;
                let keyword = self.keyword_score(&words, text);
                round2(semantic + keyword).min(self.max_score)
            })
            .collect())
    }

    /// Fraction of requirement words found as substrings of the lowercased text.
    fn keyword_score(&self, words: &[String], lowered_text: &str) -> f32 {
        let matches = words.iter().filter(|w| lowered_text.contains(w.as_str())).count();
        matches as f32 / words.len().max(1) as f32 * self.keyword_scale
    }

    fn corpus_scores(&self, job: &JobRequirements, candidates: &[CandidateDocument]) -> Vec<f32> {
        let mut documents: Vec<&str> = Vec::with_capacity(candidates.len() + 1);
        documents.push(job.as_str());
        documents.extend(candidates.iter().map(|c| c.text.as_str()));

        let space = TermVectorSpace::build_with_max_df(&self.processor, &documents, self.corpus_max_df);
        debug!("Corpus vector space: {} terms over {} documents", space.dimension(), space.len());

        (1..space.len())
            .map(|i| round2(space.similarity(0, i) * 100.0).min(self.max_score))
            .collect()
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DEFAULT_SKILLS};
    use crate::processing::embeddings::LexicalSimilarity;

    /// Fixed similarity so the keyword component can be checked exactly.
    struct ConstantSimilarity(f32);

    impl SemanticSimilarity for ConstantSimilarity {
        fn similarity(&self, _query: &str, _text: &str) -> Result<f32> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    fn engine(strategy: ScoringStrategy, semantic: Box<dyn SemanticSimilarity>) -> ScoringEngine {
        let config = Config::default();
        let skills = Arc::new(SkillMatcher::new(DEFAULT_SKILLS).unwrap());
        ScoringEngine::new(&config.scoring, semantic, skills).with_strategy(strategy)
    }

    fn scenario() -> (JobRequirements, Vec<CandidateDocument>) {
        let job = JobRequirements::new("Python developer with AWS and Docker experience").unwrap();
        let candidates = vec![
            CandidateDocument::new("a.txt", "Experienced Python and AWS engineer"),
            CandidateDocument::new("b.txt", "Marketing specialist with no technical skills."),
        ];
        (job, candidates)
    }

    #[test]
    fn test_blended_scenario() {
        let (job, candidates) = scenario();
        let engine = engine(ScoringStrategy::Blended, Box::new(LexicalSimilarity::new()));

        let scored = engine.score_all(&job, &candidates).unwrap();
        assert!(scored[0].score > scored[1].score);
        assert!(scored[0].skills.contains(&"python".to_string()));
        assert!(scored[0].skills.contains(&"aws".to_string()));
        assert!(scored[1].skills.is_empty());
        for candidate in &scored {
            assert!((0.0..=100.0).contains(&candidate.score));
        }
    }

    #[test]
    fn test_keyword_component() {
        let engine = engine(ScoringStrategy::Blended, Box::new(ConstantSimilarity(0.0)));
        let job = JobRequirements::new("python aws docker kubernetes").unwrap();
        let candidates = vec![CandidateDocument::new("a.txt", "PYTHON, Docker")];

        let scored = engine.score_all(&job, &candidates).unwrap();
        assert_eq!(scored[0].score, 25.0);
    }

    #[test]
    fn test_keyword_substring_semantics() {
        let engine = engine(ScoringStrategy::Blended, Box::new(ConstantSimilarity(0.0)));
        // "java" counts as present because it is a substring of "javascript".
        let job = JobRequirements::new("java go").unwrap();
        let candidates = vec![CandidateDocument::new("a.txt", "JavaScript")];

        let scored = engine.score_all(&job, &candidates).unwrap();
        assert_eq!(scored[0].score, 25.0);
    }

    #[test]
    fn test_score_is_clamped_and_rounded() {
        let engine = engine(ScoringStrategy::Blended, Box::new(ConstantSimilarity(0.9)));
        let job = JobRequirements::new("python").unwrap();
        let candidates = vec![
            CandidateDocument::new("a.txt", "python"),
            CandidateDocument::new("b.txt", "nothing relevant"),
        ];

        let scored = engine.score_all(&job, &candidates).unwrap();
        assert_eq!(scored[0].score, 100.0);
        assert_eq!(scored[1].score, 90.0);

        let engine = self::engine(ScoringStrategy::Blended, Box::new(ConstantSimilarity(0.123456)));
        let scored = engine.score_all(&job, &candidates[1..]).unwrap();
        assert_eq!(scored[0].score, 12.35);
    }

    #[test]
    fn test_negative_similarity_is_floored() {
        let engine = engine(ScoringStrategy::Blended, Box::new(ConstantSimilarity(-0.4)));
        let job = JobRequirements::new("python").unwrap();
        let candidates = vec![CandidateDocument::new("a.txt", "cobol")];

        let scored = engine.score_all(&job, &candidates).unwrap();
        assert_eq!(scored[0].score, 0.0);
    }

    #[test]
    fn test_non_finite_similarity_counts_as_zero() {
        let job = JobRequirements::new("python").unwrap();
        let candidates = vec![CandidateDocument::new("a.txt", "cobol")];

        for broken in [f32::NAN, f32::INFINITY] {
            let engine = engine(ScoringStrategy::Blended, Box::new(ConstantSimilarity(broken)));
            let scored = engine.score_all(&job, &candidates).unwrap();
            assert_eq!(scored[0].score, 0.0);
        }
    }

    #[test]
    fn test_empty_candidate_scores_zero_and_is_kept() {
        let (job, _) = scenario();
        for strategy in [ScoringStrategy::Blended, ScoringStrategy::Corpus] {
            let engine = engine(strategy, Box::new(LexicalSimilarity::new()));
            let candidates = vec![CandidateDocument::new("empty.txt", "")];

            let scored = engine.score_all(&job, &candidates).unwrap();
            assert_eq!(scored.len(), 1);
            assert_eq!(scored[0].score, 0.0);
            assert!(scored[0].skills.is_empty());
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let (job, candidates) = scenario();
        for strategy in [ScoringStrategy::Blended, ScoringStrategy::Corpus] {
            let engine = engine(strategy, Box::new(LexicalSimilarity::new()));
            let first = engine.score_all(&job, &candidates).unwrap();
            let second = engine.score_all(&job, &candidates).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_corpus_scenario() {
        let (job, candidates) = scenario();
        let engine = engine(ScoringStrategy::Corpus, Box::new(LexicalSimilarity::new()));

        let scored = engine.score_all(&job, &candidates).unwrap();
        assert!(scored[0].score > scored[1].score);
        for candidate in &scored {
            assert!((0.0..=100.0).contains(&candidate.score));
        }
    }

    #[test]
    fn test_corpus_scores_depend_on_batch() {
        let job = JobRequirements::new("python aws").unwrap();
        let pair = vec![
            CandidateDocument::new("a.txt", "python aws"),
            CandidateDocument::new("b.txt", "aws"),
        ];
        let mut triple = pair.clone();
        triple.push(CandidateDocument::new("c.txt", "python docker"));

        let mut config = Config::default();
        config.scoring.strategy = ScoringStrategy::Corpus;
        config.scoring.corpus_max_df = 0.7;
        let skills = Arc::new(SkillMatcher::new(DEFAULT_SKILLS).unwrap());
        let engine = ScoringEngine::new(&config.scoring, Box::new(LexicalSimilarity::new()), skills);

        let alone = engine.score_all(&job, &pair).unwrap();
        assert_eq!(alone[0].score, 100.0);
        assert_eq!(alone[1].score, 0.0);

        // The third CV pushes "python" over the document-frequency ceiling,
        // which removes the only term the job shared with a.txt.
        let together = engine.score_all(&job, &triple).unwrap();
        assert_eq!(together[0].score, 0.0);
        assert_eq!(together[1].score, 0.0);
    }

    #[test]
    fn test_raw_count_cosine_ignores_unrelated_terms() {
        let job = JobRequirements::new("python python aws").unwrap();
        let pair = vec![
            CandidateDocument::new("a.txt", "python aws"),
            CandidateDocument::new("b.txt", "aws"),
        ];
        let mut triple = pair.clone();
        triple.push(CandidateDocument::new("c.txt", "marketing brand strategy"));

        let engine = engine(ScoringStrategy::Corpus, Box::new(LexicalSimilarity::new()));
        let alone = engine.score_all(&job, &pair).unwrap();
        let together = engine.score_all(&job, &triple).unwrap();

        assert_eq!(alone[0].score, together[0].score);
        assert_eq!(alone[1].score, together[1].score);
        assert_eq!(together[2].score, 0.0);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Corpus".parse::<ScoringStrategy>().unwrap(), ScoringStrategy::Corpus);
        assert_eq!("blended".parse::<ScoringStrategy>().unwrap(), ScoringStrategy::Blended);
        assert!("tfidf".parse::<ScoringStrategy>().is_err());
    }
}
