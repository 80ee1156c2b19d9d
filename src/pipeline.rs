//! The evaluation pipeline: rate-limited, bounded-concurrency fan-out of one
//! model call per question, reassembled in input order per temperature.

#[path = "pipeline/rate_limiter.rs"]
mod rate_limiter;

#[path = "pipeline/prompt.rs"]
mod prompt;

#[path = "pipeline/types.rs"]
mod types;

#[path = "pipeline/row.rs"]
mod row;

#[path = "pipeline/driver.rs"]
mod driver;

#[cfg(test)]
#[path = "pipeline/driver_tests.rs"]
mod driver_tests;

pub use driver::{EvaluationDriver, ProgressFn, DEFAULT_MAX_WORKERS, DEFAULT_TEMPERATURES};
pub use prompt::build_prompt;
pub use rate_limiter::RateLimiter;
pub use row::RowProcessor;
pub use types::{inline_score, EvaluationTask, RowOutcome, RowResult};
