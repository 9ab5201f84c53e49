//! Fixed-vocabulary skill detection

use crate::error::{CvRankerError, Result};
use aho_corasick::{AhoCorasick, MatchKind};

/// Case-insensitive scanner for a fixed skill vocabulary.
///
/// Entries may be single tokens ("python") or phrases ("machine learning").
/// A hit only counts when it is not glued to other alphanumeric characters,
/// so "java" is not reported inside "javascript".
pub struct SkillMatcher {
    matcher: AhoCorasick,
    vocabulary: Vec<String>,
}

impl SkillMatcher {
    pub fn new<S: AsRef<str>>(vocabulary: &[S]) -> Result<Self> {
        let mut normalized: Vec<String> = Vec::new();
        for skill in vocabulary {
            let skill = skill.as_ref().trim().to_lowercase();
            if !skill.is_empty() && !normalized.contains(&skill) {
                normalized.push(skill);
            }
        }

        if normalized.is_empty() {
            return Err(CvRankerError::Configuration(
                "skill vocabulary is empty".to_string(),
            ));
        }

        // Standard semantics are required for overlapping search.
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&normalized)
            .map_err(|e| CvRankerError::Configuration(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self {
            matcher,
            vocabulary: normalized,
        })
    }

    /// Every vocabulary entry present in `text`, deduplicated, ordered by
    /// first occurrence.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();

        let mut hits: Vec<(usize, usize)> = self
            .matcher
            .find_overlapping_iter(&lowered)
            .filter(|m| is_word_bounded(&lowered, m.start(), m.end()))
            .map(|m| (m.start(), m.pattern().as_usize()))
            .collect();
        hits.sort_unstable();

        let mut skills: Vec<String> = Vec::new();
        for (_, pattern) in hits {
            let skill = &self.vocabulary[pattern];
            if !skills.contains(skill) {
                skills.push(skill.clone());
            }
        }
        skills
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn skill_count(&self) -> usize {
        self.vocabulary.len()
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
