//! Ranking of scored candidates

use crate::processing::document::ScoredCandidate;
use serde::{Deserialize, Serialize};

/// Candidates ordered by descending score. Equal scores keep input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResultList {
    candidates: Vec<ScoredCandidate>,
}

/// Number of ranked candidates that list a given skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub count: usize,
}

pub fn rank(mut candidates: Vec<ScoredCandidate>) -> RankedResultList {
    // `sort_by` is stable.
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    RankedResultList { candidates }
}

impl RankedResultList {
    /// Highest scoring candidate, if any.
    pub fn best(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredCandidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[ScoredCandidate] {
        &self.candidates
    }

    /// Skill counts in order of first appearance down the ranking.
    pub fn skill_frequency(&self) -> Vec<SkillFrequency> {
        let mut frequencies: Vec<SkillFrequency> = Vec::new();
        for candidate in &self.candidates {
            for skill in &candidate.skills {
                match frequencies.iter_mut().find(|f| &f.skill == skill) {
                    Some(entry) => entry.count += 1,
                    None => frequencies.push(SkillFrequency {
                        skill: skill.clone(),
                        count: 1,
                    }),
                }
            }
        }
        frequencies
    }
}

impl<'a> IntoIterator for &'a RankedResultList {
    type Item = &'a ScoredCandidate;
    type IntoIter = std::slice::Iter<'a, ScoredCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f32, skills: &[&str]) -> ScoredCandidate {
        ScoredCandidate {
            id: id.to_string(),
            score,
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ids(list: &RankedResultList) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    fn assert_descending(list: &RankedResultList) {
        for pair in list.as_slice().windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank(Vec::new());
        assert!(ranked.is_empty());
        assert!(ranked.best().is_none());
        assert!(ranked.skill_frequency().is_empty());
    }

    #[test]
    fn test_single_candidate() {
        let ranked = rank(vec![candidate("only.pdf", 12.5, &[])]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked.best().unwrap().id, "only.pdf");
    }

    #[test]
    fn test_descending_order() {
        let ranked = rank(vec![
            candidate("low.txt", 10.0, &[]),
            candidate("high.txt", 90.0, &[]),
            candidate("mid.txt", 55.5, &[]),
        ]);
        assert_descending(&ranked);
        assert_eq!(ids(&ranked), vec!["high.txt", "mid.txt", "low.txt"]);
        assert_eq!(ranked.best().unwrap().id, "high.txt");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(vec![
            candidate("first.txt", 40.0, &[]),
            candidate("second.txt", 40.0, &[]),
            candidate("top.txt", 70.0, &[]),
            candidate("third.txt", 40.0, &[]),
        ]);
        assert_descending(&ranked);
        assert_eq!(ids(&ranked), vec!["top.txt", "first.txt", "second.txt", "third.txt"]);
    }

    #[test]
    fn test_all_equal_scores() {
        let input: Vec<ScoredCandidate> = (0..6).map(|i| candidate(&format!("cv{}.txt", i), 0.0, &[])).collect();
        let ranked = rank(input.clone());
        assert_eq!(ranked.as_slice(), input.as_slice());
    }

    #[test]
    fn test_skill_frequency() {
        let ranked = rank(vec![
            candidate("b.txt", 20.0, &["sql", "python"]),
            candidate("a.txt", 80.0, &["python", "aws"]),
            candidate("c.txt", 5.0, &[]),
        ]);
        let frequency = ranked.skill_frequency();
        assert_eq!(
            frequency,
            vec![
                SkillFrequency { skill: "python".into(), count: 2 },
                SkillFrequency { skill: "aws".into(), count: 1 },
                SkillFrequency { skill: "sql".into(), count: 1 },
            ]
        );
    }
}
