use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::dataset::{batch_file_name, OutputBatch, QuestionSet};
use crate::error::BenchError;
use crate::invoker::ModelInvoker;

use super::rate_limiter::RateLimiter;
use super::row::RowProcessor;
use super::types::{inline_score, EvaluationTask, RowResult};

pub const DEFAULT_TEMPERATURES: [f32; 3] = [0.0, 0.5, 1.0];
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Progress hook: `(temperature, completed, total)`.
pub type ProgressFn = dyn Fn(f32, usize, usize) + Send + Sync;

/// Runs every question against one model at each configured temperature.
///
/// Temperatures are processed one after another. Within a temperature, rows
/// run concurrently on at most `max_workers` tasks, finish in any order, and
/// are put back in input order before the batch is written.
pub struct EvaluationDriver {
    processor: RowProcessor,
    model: Arc<str>,
    temperatures: Vec<f32>,
    max_workers: usize,
    output_dir: PathBuf,
    progress: Option<Arc<ProgressFn>>,
}

impl EvaluationDriver {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        limiter: Arc<RateLimiter>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            processor: RowProcessor::new(invoker, limiter),
            model: Arc::from(model.into()),
            temperatures: DEFAULT_TEMPERATURES.to_vec(),
            max_workers: DEFAULT_MAX_WORKERS,
            output_dir: PathBuf::from("."),
            progress: None,
        }
    }

    pub fn temperatures(mut self, temperatures: impl Into<Vec<f32>>) -> Self {
        self.temperatures = temperatures.into();
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(f32, usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(f));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Evaluates the question file at `input` and returns the written batch paths.
    ///
    /// A missing input file aborts before any request is made. Failures of
    /// individual rows never abort the run.
    pub async fn run(&self, input: &Path) -> Result<Vec<PathBuf>, BenchError> {
        let questions = QuestionSet::load(input)?;
        std::fs::create_dir_all(&self.output_dir)?;
        log::info!(
            "starting evaluation of {} questions with model {}",
            questions.len(),
            self.model
        );

        let mut written = Vec::with_capacity(self.temperatures.len());
        for &temperature in &self.temperatures {
            log::info!(
                "processing temperature {temperature} | workers: {}",
                self.max_workers
            );
            let results = self.evaluate_temperature(&questions, temperature).await;

            let mut reasons = results.iter().filter_map(|r| r.outcome.failure_reason());
            if let Some(first) = reasons.next() {
                log::warn!(
                    "{} of {} rows failed at temperature {temperature}; first error: {first}",
                    reasons.count() + 1,
                    results.len()
                );
            }
            let (hits, total) = inline_score(&questions.questions, &results);
            log::info!("inline-parse accuracy at temperature {temperature}: {hits}/{total}");

            let batch = OutputBatch::assemble(&questions, &results);
            let path = self.output_dir.join(batch_file_name(&self.model, temperature));
            batch.write(&path)?;
            log::info!("results saved to {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Fans out one task per question, collects in completion order and
    /// returns results in input order. Always yields exactly one result per
    /// question.
    pub async fn evaluate_temperature(
        &self,
        questions: &QuestionSet,
        temperature: f32,
    ) -> Vec<RowResult> {
        let total = questions.len();
        let permits = Arc::new(Semaphore::new(self.max_workers));

        let mut pending = FuturesUnordered::new();
        for (row, question) in questions.questions.iter().enumerate() {
            let task = EvaluationTask {
                row,
                question: question.clone(),
                temperature,
                model: self.model.clone(),
            };
            let processor = self.processor.clone();
            let permits = Arc::clone(&permits);

            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                processor.run(task).await
            });
            pending.push(async move { (row, handle.await) });
        }

        let mut by_row: HashMap<usize, RowResult> = HashMap::with_capacity(total);
        while let Some((row, joined)) = pending.next().await {
            let result = joined.unwrap_or_else(|err| {
                let message = join_error_message(err);
                log::error!("fatal error in worker for row {row}: {message}");
                RowResult::fatal(row, &self.model, temperature, message)
            });
            by_row.insert(row, result);
            if let Some(progress) = &self.progress {
                progress(temperature, by_row.len(), total);
            }
        }

        (0..total)
            .map(|row| {
                by_row.remove(&row).unwrap_or_else(|| {
                    RowResult::fatal(row, &self.model, temperature, "no result recorded".into())
                })
            })
            .collect()
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}
