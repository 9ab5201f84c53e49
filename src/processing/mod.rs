//! Scoring and ranking of candidate documents

pub mod document;
pub mod text_processor;
pub mod term_vector;
pub mod embeddings;
pub mod skills;
pub mod scorer;
pub mod ranker;
pub mod analyzer;
