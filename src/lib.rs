//! Benchmark harness for LLM accuracy on Brazilian university entrance exams
//! ("vestibulares").
//!
//! Each question is sent to a model at several sampling temperatures through
//! a shared rate limiter and a bounded worker pool; results are written one
//! CSV batch per (model, temperature) in input order, optionally re-parsed by
//! the [`cleaner`], and summarized by the [`analysis`] module.

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod invoker;
pub mod pipeline;

pub use error::{BenchError, InvokeError};
pub use invoker::{Completion, ModelInvoker};
pub use pipeline::{EvaluationDriver, RateLimiter};
