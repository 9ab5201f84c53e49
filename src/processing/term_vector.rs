//! Term-frequency vector space and cosine similarity

use crate::processing::text_processor::TextProcessor;
use std::collections::{BTreeMap, BTreeSet};

/// Raw term-count vectors over a vocabulary built from a set of documents.
///
/// The vocabulary depends on every document passed to [`TermVectorSpace::build`],
/// so similarities computed in one space are only comparable within it.
#[derive(Debug, Clone)]
pub struct TermVectorSpace {
    vocabulary: BTreeMap<String, usize>,
    vectors: Vec<Vec<f32>>,
}

impl TermVectorSpace {
    pub fn build<S: AsRef<str>>(processor: &TextProcessor, documents: &[S]) -> Self {
        Self::build_with_max_df(processor, documents, 1.0)
    }

    /// Build the space, dropping terms that occur in more than
    /// `max_df * documents.len()` documents.
    pub fn build_with_max_df<S: AsRef<str>>(
        processor: &TextProcessor,
        documents: &[S],
        max_df: f32,
    ) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| processor.tokenize(doc.as_ref()))
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(|t| t.as_str()).collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let max_count = max_df * tokenized.len() as f32;
        // Sorted term order gives stable column indices.
        let vocabulary: BTreeMap<String, usize> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df as f32 <= max_count)
            .enumerate()
            .map(|(index, (term, _))| (term.to_string(), index))
            .collect();

        let vectors = tokenized
            .iter()
            .map(|tokens| {
                let mut vector = vec![0.0; vocabulary.len()];
                for token in tokens {
                    if let Some(&index) = vocabulary.get(token) {
                        vector[index] += 1.0;
                    }
                }
                vector
            })
            .collect();

        Self { vocabulary, vectors }
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        self.vectors.get(index).map(|v| v.as_slice())
    }

    /// Cosine similarity between two documents of this space.
    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        match (self.vector(a), self.vector(b)) {
            (Some(va), Some(vb)) => cosine_similarity(va, vb),
            _ => 0.0,
        }
    }
}

/// Cosine similarity, defined as 0 when either vector has zero norm
/// or the dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
