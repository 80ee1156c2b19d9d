//! Accuracy reporting over written result batches.

#[path = "analysis/loader.rs"]
mod loader;

#[path = "analysis/accuracy.rs"]
mod accuracy;

#[path = "analysis/report.rs"]
mod report;

pub use accuracy::{accuracy_by, normalize_answer, ScoredRow};
pub use loader::ResultAnalyzer;
pub use report::{AccuracyReport, AreaPivot, ExamAccuracy, ModelAccuracy};
