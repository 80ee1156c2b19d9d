use std::sync::Arc;

use crate::dataset::Question;

pub const EMPTY_SENTINEL: &str = "!EMPTY!";
pub const ERROR_SENTINEL: &str = "!ERROR!";
pub const FATAL_SENTINEL: &str = "FATAL_ERROR";

/// One unit of work handed to a worker; consumed exactly once.
#[derive(Debug, Clone)]
pub struct EvaluationTask {
    pub row: usize,
    pub question: Question,
    pub temperature: f32,
    pub model: Arc<str>,
}

/// How a single row ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// First character of the trimmed, uppercased response
    Answered(String),
    /// The model returned no text
    Empty,
    /// The invocation failed; carries the error text
    Error(String),
    /// The worker itself died before producing a result
    Fatal(String),
}

impl RowOutcome {
    /// Value written to the chosen-answer column.
    ///
    /// Sentinels never equal a valid letter, so failed rows count as wrong.
    pub fn label(&self) -> String {
        match self {
            RowOutcome::Answered(letter) => letter.clone(),
            RowOutcome::Empty => EMPTY_SENTINEL.to_string(),
            RowOutcome::Error(_) => ERROR_SENTINEL.to_string(),
            RowOutcome::Fatal(_) => FATAL_SENTINEL.to_string(),
        }
    }

    /// Error text carried by a failed row.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            RowOutcome::Error(reason) | RowOutcome::Fatal(reason) => Some(reason),
            RowOutcome::Answered(_) | RowOutcome::Empty => None,
        }
    }

    /// Whether the inline answer matches `correct` (case-insensitive).
    pub fn matches(&self, correct: &str) -> bool {
        match self {
            RowOutcome::Answered(letter) => {
                let correct = correct.trim();
                !correct.is_empty() && letter.eq_ignore_ascii_case(correct)
            }
            _ => false,
        }
    }
}

/// Inline-parse tally for one batch: `(correct, total)`.
///
/// Rows are paired positionally; this is the quick in-run figure, the
/// analyzer's numbers come from the (possibly cleaned) files.
pub fn inline_score(questions: &[Question], results: &[RowResult]) -> (usize, usize) {
    let hits = questions
        .iter()
        .zip(results)
        .filter(|(q, r)| r.outcome.matches(&q.correct))
        .count();
    (hits, results.len())
}

/// Result of processing one [`EvaluationTask`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    pub row: usize,
    pub outcome: RowOutcome,
    /// Unparsed response text, or the error text when the call failed
    pub raw_response: String,
    pub model: String,
    /// Wall-clock seconds, rounded to 4 decimals
    pub elapsed_secs: f64,
    pub temperature: f32,
}

impl RowResult {
    pub(crate) fn fatal(row: usize, model: &str, temperature: f32, message: String) -> Self {
        Self {
            row,
            outcome: RowOutcome::Fatal(message.clone()),
            raw_response: message,
            model: model.to_string(),
            elapsed_secs: 0.0,
            temperature,
        }
    }
}
