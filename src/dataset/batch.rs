use std::path::Path;

use crate::error::BenchError;
use crate::pipeline::RowResult;

use super::columns;
use super::question::QuestionSet;
use super::table::CsvTable;

const BATCH_PREFIX: &str = "vestibench";

/// Model identifier made safe for file names.
pub fn safe_model_name(model: &str) -> String {
    model.replace('/', "-")
}

/// Deterministic artifact name for one (model, temperature) pair,
/// e.g. `vestibench_openai-gpt-4o_t0.5.csv`.
pub fn batch_file_name(model: &str, temperature: f32) -> String {
    format!(
        "{BATCH_PREFIX}_{}_t{temperature}.csv",
        safe_model_name(model)
    )
}

/// Results for one (model, temperature) pair joined row-wise with the
/// question columns they answer.
#[derive(Debug)]
pub struct OutputBatch {
    table: CsvTable,
}

impl OutputBatch {
    /// Joins `results` (already in input order) with the input columns.
    pub fn assemble(questions: &QuestionSet, results: &[RowResult]) -> Self {
        debug_assert_eq!(questions.len(), results.len());
        let mut headers = questions.table.headers.clone();
        headers.extend(columns::RESULT_COLUMNS.iter().map(|c| c.to_string()));

        let mut table = CsvTable::new(headers);
        for (idx, result) in results.iter().enumerate() {
            let mut row: Vec<String> = (0..questions.table.headers.len())
                .map(|col| questions.table.get(idx, col).to_string())
                .collect();
            row.extend([
                result.outcome.label(),
                result.raw_response.clone(),
                result.model.clone(),
                result.elapsed_secs.to_string(),
                result.temperature.to_string(),
            ]);
            table.rows.push(row);
        }
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &CsvTable {
        &self.table
    }

    pub fn write(&self, path: &Path) -> Result<(), BenchError> {
        self.table.write(path)
    }
}
