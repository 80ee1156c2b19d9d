use std::sync::Arc;
use std::time::Instant;

use crate::dataset::Question;
use crate::invoker::ModelInvoker;

use super::prompt::build_prompt;
use super::rate_limiter::RateLimiter;
use super::types::{EvaluationTask, RowOutcome, RowResult};

/// Asks the model one question and turns whatever happens into a [`RowResult`].
#[derive(Clone)]
pub struct RowProcessor {
    invoker: Arc<dyn ModelInvoker>,
    limiter: Arc<RateLimiter>,
}

impl RowProcessor {
    pub fn new(invoker: Arc<dyn ModelInvoker>, limiter: Arc<RateLimiter>) -> Self {
        Self { invoker, limiter }
    }

    pub async fn run(&self, task: EvaluationTask) -> RowResult {
        let mut result = self
            .process(&task.question, &task.model, task.temperature)
            .await;
        result.row = task.row;
        result
    }

    /// Never fails: invoker errors come back as [`RowOutcome::Error`].
    pub async fn process(&self, question: &Question, model: &str, temperature: f32) -> RowResult {
        let prompt = build_prompt(question);
        let start = Instant::now();

        self.limiter.acquire().await;
        let (outcome, raw_response) = match self.invoker.invoke(model, &prompt, temperature).await {
            Ok(completion) => (classify(&completion.content), completion.content),
            Err(err) => {
                log::warn!(
                    "model request failed for row {} ({}, {}): {err}",
                    question.row,
                    question.exam,
                    question.area.as_deref().unwrap_or("no area")
                );
                let message = err.to_string();
                (RowOutcome::Error(message.clone()), message)
            }
        };

        RowResult {
            row: question.row,
            outcome,
            raw_response,
            model: model.to_string(),
            elapsed_secs: round4(start.elapsed().as_secs_f64()),
            temperature,
        }
    }
}

/// Inline first-letter parse; the cleaner re-derives a sturdier answer later.
fn classify(content: &str) -> RowOutcome {
    match content.trim().to_uppercase().chars().next() {
        Some(first) => RowOutcome::Answered(first.to_string()),
        None => RowOutcome::Empty,
    }
}

fn round4(secs: f64) -> f64 {
    (secs * 10_000.0).round() / 10_000.0
}
