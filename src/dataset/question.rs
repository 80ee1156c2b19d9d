use std::path::Path;

use crate::error::BenchError;

use super::columns;
use super::table::CsvTable;

pub const OPTION_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// One exam item, read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Ordinal position in the source file
    pub row: usize,
    /// Exam identifier ("vestibular")
    pub exam: String,
    pub area: Option<String>,
    pub text: String,
    /// Option texts, A through E
    pub options: [String; 5],
    pub correct: String,
}

/// Questions of one input file, plus the raw table they came from so result
/// batches can carry every input column through unchanged.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
    pub(crate) table: CsvTable,
}

impl QuestionSet {
    /// Loads the question file.
    ///
    /// A missing file is reported as [`BenchError::InputNotFound`] so callers
    /// can stop before any model request is made.
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        if !path.exists() {
            return Err(BenchError::InputNotFound(path.to_path_buf()));
        }
        let table = CsvTable::read(path)?;
        Self::from_table(table, path)
    }

    fn from_table(table: CsvTable, path: &Path) -> Result<Self, BenchError> {
        let require = |names: &[&str]| {
            table
                .column_any(names)
                .ok_or_else(|| BenchError::MissingColumn {
                    file: path.to_path_buf(),
                    column: names[0].to_string(),
                })
        };

        let text = require(&[columns::QUESTION])?;
        let exam = require(&[columns::EXAM])?;
        let correct = require(&[columns::CORRECT, columns::CORRECT_ALIAS])?;
        let mut options = [0usize; 5];
        for (slot, name) in options.iter_mut().zip(columns::OPTIONS) {
            *slot = require(&[name])?;
        }
        let area = table.column_any(&[columns::AREA, columns::AREA_ALIAS]);

        let questions = (0..table.len())
            .map(|row| Question {
                row,
                exam: table.get(row, exam).to_string(),
                area: area
                    .map(|col| table.get(row, col).trim())
                    .filter(|v| !v.is_empty())
                    .map(String::from),
                text: table.get(row, text).to_string(),
                options: options.map(|col| table.get(row, col).to_string()),
                correct: table.get(row, correct).to_string(),
            })
            .collect();

        Ok(Self { questions, table })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Input column names, in file order.
    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }
}
