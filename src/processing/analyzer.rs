//! Batch analysis: extraction, scoring and ranking of a set of CVs

use crate::config::Config;
use crate::error::{CvRankerError, EmptyInputKind, Result};
use crate::input::InputManager;
use crate::processing::document::{CandidateDocument, JobRequirements};
use crate::processing::embeddings::{self, SemanticSimilarity};
use crate::processing::ranker::{self, RankedResultList};
use crate::processing::scorer::{ScoringEngine, ScoringStrategy};
use crate::processing::skills::SkillMatcher;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation flag shared between a caller and a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CvRankerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Drive `run` until it finishes or is interrupted.
///
/// The first interrupt flips `cancel` so the run can stop between files. A
/// second one abandons the run outright, which covers a parser stuck on a
/// blocking thread.
pub async fn run_until_interrupted<T, F, I, S>(run: F, cancel: &CancelToken, mut interrupt: I) -> Result<T>
where
    F: Future<Output = Result<T>>,
    I: FnMut() -> S,
    S: Future<Output = ()>,
{
    let escalate = async {
        interrupt().await;
        warn!("Cancelling analysis, interrupt again to abort immediately");
        cancel.cancel();
        interrupt().await;
        warn!("Abandoning analysis");
    };

    tokio::select! {
        result = run => result,
        _ = escalate => Err(CvRankerError::Cancelled),
    }
}

/// Result of one complete analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub ranked: RankedResultList,
    /// Files excluded because their text could not be extracted
    pub failed_count: usize,
    pub strategy: ScoringStrategy,
    pub semantic_backend: String,
    pub processing_time_ms: u64,
}

impl AnalysisOutcome {
    pub fn analyzed_count(&self) -> usize {
        self.ranked.len()
    }
}

/// Coordinates extraction, scoring and ranking for a batch of CV files.
pub struct AnalysisEngine {
    input: InputManager,
    scorer: ScoringEngine,
    show_progress: bool,
}

impl AnalysisEngine {
    /// Build from config, loading the configured semantic backend.
    pub async fn new(config: &Config) -> Result<Self> {
        let backend = embeddings::load_backend(config).await;
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: &Config, backend: Box<dyn SemanticSimilarity>) -> Result<Self> {
        let skills = Arc::new(SkillMatcher::new(config.skills.vocabulary.as_slice())?);
        info!(
            "Analysis engine ready: {} strategy, {} similarity, {} skills",
            config.scoring.strategy,
            backend.name(),
            skills.skill_count()
        );

        Ok(Self {
            input: InputManager::new().with_cache(config.processing.enable_caching),
            scorer: ScoringEngine::new(&config.scoring, backend, skills),
            show_progress: config.processing.show_progress,
        })
    }

    pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.scorer = self.scorer.with_strategy(strategy);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Analyze `paths` against `job_requirements`.
    ///
    /// Either a complete outcome is returned or an error; no partial result is
    /// ever produced. Files whose text cannot be extracted are skipped and
    /// counted in [`AnalysisOutcome::failed_count`]. Every run reads its files
    /// afresh.
    pub async fn analyze(
        &mut self,
        paths: &[PathBuf],
        job_requirements: &str,
        cancel: &CancelToken,
    ) -> Result<AnalysisOutcome> {
        if paths.is_empty() {
            return Err(CvRankerError::EmptyInput(EmptyInputKind::NoFiles));
        }
        let job = JobRequirements::new(job_requirements)?;
        self.input.clear_cache();

        let start_time = Instant::now();
        let progress = self.progress_bar(paths.len() as u64);

        let mut documents: Vec<CandidateDocument> = Vec::with_capacity(paths.len());
        let mut failed_count = 0;

        for path in paths {
            cancel.check().inspect_err(|_| progress.abandon())?;
            progress.set_message(path.display().to_string());

            match self.input.load_candidate(path).await {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    failed_count += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        if documents.is_empty() {
            return Err(CvRankerError::NoResults {
                attempted: failed_count,
            });
        }

        cancel.check()?;
        let outcome = self.score_documents(&job, &documents, failed_count, cancel)?;

        let elapsed = start_time.elapsed().as_millis() as u64;
        info!(
            "Analyzed {} CV(s), {} failed, in {}ms",
            outcome.analyzed_count(),
            failed_count,
            elapsed
        );

        Ok(AnalysisOutcome {
            processing_time_ms: elapsed,
            ..outcome
        })
    }

    /// Score already-extracted documents. Useful when the caller owns extraction.
    pub fn analyze_documents(
        &self,
        job_requirements: &str,
        documents: &[CandidateDocument],
        cancel: &CancelToken,
    ) -> Result<AnalysisOutcome> {
        if documents.is_empty() {
            return Err(CvRankerError::EmptyInput(EmptyInputKind::NoFiles));
        }
        let job = JobRequirements::new(job_requirements)?;

        let start_time = Instant::now();
        let outcome = self.score_documents(&job, documents, 0, cancel)?;

        Ok(AnalysisOutcome {
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            ..outcome
        })
    }

    fn score_documents(
        &self,
        job: &JobRequirements,
        documents: &[CandidateDocument],
        failed_count: usize,
        cancel: &CancelToken,
    ) -> Result<AnalysisOutcome> {
        let scored = match self.scorer.strategy() {
            // Candidates are independent, so the batch can be abandoned between them.
            ScoringStrategy::Blended => {
                let mut scored = Vec::with_capacity(documents.len());
                for document in documents {
                    cancel.check()?;
                    scored.extend(self.scorer.score_all(job, std::slice::from_ref(document))?);
                }
                scored
            }
            ScoringStrategy::Corpus => self.scorer.score_all(job, documents)?,
        };
        cancel.check()?;

        Ok(AnalysisOutcome {
            ranked: ranker::rank(scored),
            failed_count,
            strategy: self.scorer.strategy(),
            semantic_backend: self.scorer.semantic_backend().to_string(),
            processing_time_ms: 0,
        })
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::LexicalSimilarity;

    fn engine() -> AnalysisEngine {
        let config = Config::default();
        AnalysisEngine::with_backend(&config, Box::new(LexicalSimilarity::new()))
            .unwrap()
            .with_progress(false)
    }

    #[tokio::test]
    async fn test_no_files_is_empty_input() {
        let mut engine = engine();
        let err = engine
            .analyze(&[], "Python developer", &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CvRankerError::EmptyInput(EmptyInputKind::NoFiles)));
    }

    #[tokio::test]
    async fn test_blank_requirements_is_empty_input() {
        let mut engine = engine();
        let err = engine
            .analyze(&[PathBuf::from("missing.txt")], "  ", &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CvRankerError::EmptyInput(EmptyInputKind::NoRequirements)));
    }

    #[tokio::test]
    async fn test_all_failures_is_no_results() {
        let mut engine = engine();
        let paths = vec![PathBuf::from("cv.odt"), PathBuf::from("does-not-exist.txt")];
        let err = engine
            .analyze(&paths, "Python developer", &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CvRankerError::NoResults { attempted: 2 }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut engine = engine();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = engine
            .analyze(&[PathBuf::from("a.txt")], "Python", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CvRankerError::Cancelled));
    }

    #[test]
    fn test_analyze_documents_ranks() {
        let engine = engine();
        let documents = vec![
            CandidateDocument::new("marketing.txt", "Marketing specialist with no technical skills."),
            CandidateDocument::new("engineer.txt", "Experienced Python and AWS engineer"),
        ];

        let outcome = engine
            .analyze_documents("Python developer with AWS and Docker experience", &documents, &CancelToken::new())
            .unwrap();
        assert_eq!(outcome.analyzed_count(), 2);
        assert_eq!(outcome.failed_count, 0);
        assert_eq!(outcome.ranked.best().unwrap().id, "engineer.txt");
        assert_eq!(outcome.semantic_backend, "lexical");
    }

    fn interrupts(count: usize) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        for _ in 0..count {
            tx.send(()).unwrap();
        }
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        move || {
            let rx = rx.clone();
            Box::pin(async move {
                if rx.lock().await.recv().await.is_none() {
                    std::future::pending::<()>().await;
                }
            })
        }
    }

    #[tokio::test]
    async fn test_uninterrupted_run_returns_its_result() {
        let cancel = CancelToken::new();
        let result = run_until_interrupted(async { Ok(7) }, &cancel, interrupts(0)).await;
        assert_eq!(result.unwrap(), 7);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_first_interrupt_cancels_cooperatively() {
        let cancel = CancelToken::new();
        let run = async {
            while !cancel.is_cancelled() {
                tokio::task::yield_now().await;
            }
            Ok("stopped between files")
        };

        let result = run_until_interrupted(run, &cancel, interrupts(1)).await;
        assert_eq!(result.unwrap(), "stopped between files");
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_second_interrupt_abandons_stuck_run() {
        let cancel = CancelToken::new();
        let stuck = std::future::pending::<Result<()>>();

        let err = run_until_interrupted(stuck, &cancel, interrupts(2)).await.unwrap_err();
        assert!(matches!(err, CvRankerError::Cancelled));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
