//! Question files, result batches and the column layout they share.

#[path = "dataset/columns.rs"]
pub mod columns;

#[path = "dataset/table.rs"]
mod table;

#[path = "dataset/question.rs"]
mod question;

#[path = "dataset/batch.rs"]
mod batch;

pub use batch::{batch_file_name, safe_model_name, OutputBatch};
pub use question::{Question, QuestionSet, OPTION_LETTERS};
pub use table::CsvTable;
