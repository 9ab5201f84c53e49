//! Input manager for handling different file types

use crate::error::{CvRankerError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{DocxExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::processing::document::CandidateDocument;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        // Unsupported suffixes fail the same way whether or not the file exists.
        let file_type = FileType::from_path(path);
        if !file_type.is_supported() {
            return Err(unsupported(path));
        }

        if !path.exists() {
            return Err(CvRankerError::Extraction {
                path: path.display().to_string(),
                reason: "file does not exist".to_string(),
            });
        }

        let text = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Docx => {
                info!("Extracting text from DOCX: {}", path.display());
                DocxExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Unknown => return Err(unsupported(path)),
        };

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Extract a file into a candidate named after its final path segment.
    pub async fn load_candidate(&mut self, path: &Path) -> Result<CandidateDocument> {
        let text = self.extract_text(path).await?;
        Ok(CandidateDocument::from_path(path, text))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn unsupported(path: &Path) -> CvRankerError {
    CvRankerError::UnsupportedFormat(format!(
        "Unsupported file type for: {} (expected .pdf, .docx or .txt)",
        path.display()
    ))
}
