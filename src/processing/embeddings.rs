//! Semantic similarity backends

use crate::config::{Config, SemanticBackend};
use crate::error::{CvRankerError, Result};
use crate::processing::term_vector::{cosine_similarity, TermVectorSpace};
use crate::processing::text_processor::TextProcessor;
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use std::path::PathBuf;
use std::time::Instant;

/// Similarity between a query and a text, in [-1, 1] before clamping.
pub trait SemanticSimilarity: Send + Sync {
    fn similarity(&self, query: &str, text: &str) -> Result<f32>;

    /// Score many texts against one query.
    fn similarities(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        texts.iter().map(|text| self.similarity(query, text)).collect()
    }

    fn name(&self) -> &str;
}

/// Cosine similarity of Model2Vec static embeddings.
pub struct Model2VecSimilarity {
    model: StaticModel,
    model_name: String,
}

impl Model2VecSimilarity {
    pub async fn load(config: &Config) -> Result<Self> {
        let model_name = config.models.embedding_model.clone();
        let source = Self::model_source(config);
        let start_time = Instant::now();

        info!("Loading Model2Vec embedding model from: {}", source.display());

        let model = tokio::task::spawn_blocking(move || {
            StaticModel::from_pretrained(&source, None, None, None)
        })
        .await
        .map_err(|e| CvRankerError::ModelLoading(format!("Model loader aborted: {}", e)))??;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self { model, model_name })
    }

    /// A copy under `models_dir` wins over the hub id.
    fn model_source(config: &Config) -> PathBuf {
        let local_path = config.models.models_dir.join(&config.models.embedding_model);
        if local_path.exists() {
            local_path
        } else {
            PathBuf::from(&config.models.embedding_model)
        }
    }
}

impl SemanticSimilarity for Model2VecSimilarity {
    fn similarity(&self, query: &str, text: &str) -> Result<f32> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        let query_embedding = self.model.encode_single(query);
        let text_embedding = self.model.encode_single(text);
        Ok(cosine_similarity(&query_embedding, &text_embedding))
    }

    fn similarities(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let query_embedding = self.model.encode_single(query);
        let embeddings = self.model.encode(texts);

        if embeddings.len() != texts.len() {
            return Err(CvRankerError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(texts
            .iter()
            .zip(embeddings.iter())
            .map(|(text, embedding)| {
                if text.trim().is_empty() {
                    0.0
                } else {
                    cosine_similarity(&query_embedding, embedding)
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Bag-of-words cosine similarity of two texts. Needs no model files.
#[derive(Default)]
pub struct LexicalSimilarity {
    processor: TextProcessor,
}

impl LexicalSimilarity {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SemanticSimilarity for LexicalSimilarity {
    fn similarity(&self, query: &str, text: &str) -> Result<f32> {
        let space = TermVectorSpace::build(&self.processor, &[query, text]);
        Ok(space.similarity(0, 1))
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

/// Build the configured backend, falling back to lexical similarity when the
/// embedding model cannot be loaded.
pub async fn load_backend(config: &Config) -> Box<dyn SemanticSimilarity> {
    match config.scoring.semantic_backend {
        SemanticBackend::Lexical => Box::new(LexicalSimilarity::new()),
        SemanticBackend::Model2vec => match Model2VecSimilarity::load(config).await {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                warn!("Could not load embedding model: {}", e);
                warn!("Proceeding with lexical similarity only");
                Box::new(LexicalSimilarity::new())
            }
        },
    }
}
