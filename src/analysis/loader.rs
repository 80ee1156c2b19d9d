use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cleaner::is_cleaned;
use crate::dataset::{columns, CsvTable};
use crate::error::BenchError;

use super::accuracy::ScoredRow;
use super::report::AccuracyReport;

/// Loads result batches and produces accuracy reports.
#[derive(Debug, Clone)]
pub struct ResultAnalyzer {
    result_dir: PathBuf,
    output_dir: PathBuf,
    metadata_source: Option<PathBuf>,
}

/// Knowledge areas from the question source.
///
/// Joined on the question text, plus the exam when both the source and the
/// batch carry a `vestibular` column. Duplicate keys keep the first match.
struct AreaIndex {
    by_question: HashMap<String, Option<String>>,
    by_question_and_exam: Option<HashMap<(String, String), Option<String>>>,
}

impl AreaIndex {
    fn load(path: &Path) -> Result<Option<Self>, BenchError> {
        let mut table = CsvTable::read(path)?;
        table.rename_column(columns::AREA_ALIAS, columns::AREA);
        let (Some(question), Some(area)) =
            (table.column(columns::QUESTION), table.column(columns::AREA))
        else {
            return Ok(None);
        };
        let exam = table.column(columns::EXAM);

        let mut by_question = HashMap::new();
        let mut by_question_and_exam = exam.map(|_| HashMap::new());
        for row in 0..table.len() {
            let text = table.get(row, question).to_string();
            let value = Some(table.get(row, area).trim().to_string()).filter(|v| !v.is_empty());
            if let (Some(map), Some(col)) = (by_question_and_exam.as_mut(), exam) {
                map.entry((text.clone(), table.get(row, col).to_string()))
                    .or_insert_with(|| value.clone());
            }
            by_question.entry(text).or_insert(value);
        }
        Ok(Some(Self {
            by_question,
            by_question_and_exam,
        }))
    }

    /// `exam` is `None` when the batch has no `vestibular` column.
    fn lookup(&self, question: &str, exam: Option<&str>) -> Option<String> {
        let found = match (&self.by_question_and_exam, exam) {
            (Some(map), Some(exam)) => map.get(&(question.to_string(), exam.to_string())),
            _ => self.by_question.get(question),
        };
        found.cloned().flatten()
    }
}

impl ResultAnalyzer {
    pub fn new(result_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            result_dir: result_dir.into(),
            output_dir: output_dir.into(),
            metadata_source: None,
        }
    }

    /// Question file whose knowledge-area tags replace the ones in the batches.
    pub fn with_metadata_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_source = Some(path.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Batch files to read: cleaned companions when any exist, otherwise
    /// every non-empty CSV.
    pub fn batch_files(&self) -> Result<Vec<PathBuf>, BenchError> {
        let mut all: Vec<PathBuf> = std::fs::read_dir(&self.result_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        all.sort();

        let cleaned: Vec<PathBuf> = all.iter().filter(|p| is_cleaned(p)).cloned().collect();
        if !cleaned.is_empty() {
            log::info!("loading {} cleaned files", cleaned.len());
            return Ok(cleaned);
        }

        let files: Vec<PathBuf> = all
            .into_iter()
            .filter(|p| std::fs::metadata(p).is_ok_and(|m| m.len() > 0))
            .collect();
        log::info!(
            "loading {} raw files (run the cleaner for sturdier answer parsing)",
            files.len()
        );
        Ok(files)
    }

    /// Reads every batch into scored rows.
    pub fn load(&self) -> Result<Vec<ScoredRow>, BenchError> {
        if !self.result_dir.exists() {
            return Err(BenchError::NoResults(self.result_dir.clone()));
        }
        let files = self.batch_files()?;
        if files.is_empty() {
            return Err(BenchError::NoResults(self.result_dir.clone()));
        }

        let areas = self.area_index();
        let mut rows = Vec::new();
        for path in &files {
            match CsvTable::read(path) {
                Ok(table) => rows.extend(score_table(table, areas.as_ref())),
                Err(err) => log::error!("error loading {}: {err}", path.display()),
            }
        }
        Ok(rows)
    }

    fn area_index(&self) -> Option<AreaIndex> {
        let path = self.metadata_source.as_ref().filter(|p| p.exists())?;
        log::info!("syncing knowledge areas from {}", path.display());
        match AreaIndex::load(path) {
            Ok(Some(index)) => Some(index),
            Ok(None) => {
                log::warn!(
                    "{} lacks '{}' or '{}'; keeping areas from the batches",
                    path.display(),
                    columns::QUESTION,
                    columns::AREA
                );
                None
            }
            Err(err) => {
                log::warn!("could not read {}: {err}", path.display());
                None
            }
        }
    }

    /// Loads every batch and writes the accuracy tables to the output dir.
    pub fn generate_accuracy_report(&self) -> Result<AccuracyReport, BenchError> {
        let rows = self.load()?;
        let report = AccuracyReport::from_rows(&rows);
        let written = report.write(&self.output_dir)?;
        Ok(report.with_written(written))
    }
}

fn score_table(mut table: CsvTable, areas: Option<&AreaIndex>) -> Vec<ScoredRow> {
    table.rename_column(columns::CORRECT_ALIAS, columns::CORRECT);
    table.rename_column(columns::AREA_ALIAS, columns::AREA);

    let col = |name: &str| table.column(name);
    let (model, temp, exam, area, question, correct, chosen) = (
        col(columns::MODEL),
        col(columns::TEMPERATURE),
        col(columns::EXAM),
        col(columns::AREA),
        col(columns::QUESTION),
        col(columns::CORRECT),
        col(columns::CHOSEN),
    );
    let cell = |row: usize, idx: Option<usize>| idx.map_or("", |c| table.get(row, c));

    (0..table.len())
        .map(|row| {
            let question_text = cell(row, question);
            let area = match areas {
                Some(index) => index.lookup(question_text, exam.map(|c| table.get(row, c))),
                None => Some(cell(row, area).trim().to_string()).filter(|v| !v.is_empty()),
            };
            ScoredRow::new(
                cell(row, model),
                cell(row, temp),
                cell(row, exam),
                area,
                question_text,
                cell(row, correct),
                cell(row, chosen),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    const BATCH_HEADER: &str = "vestibular,questão,alternativa correta,area_conhecimento,alternativa escolhida pela ia,modelo,temperature used during test";

    #[test]
    fn prefers_cleaned_files() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("run.csv"),
            format!("{BATCH_HEADER}\nENEM,q1,A,Bio,B,m,0\n"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("run_cleaned.csv"),
            format!("{BATCH_HEADER}\nENEM,q1,A,Bio,a,m,0\n"),
        )
        .unwrap();

        let rows = ResultAnalyzer::new(dir.path(), dir.path().join("out"))
            .load()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_correct);
        assert_eq!(rows[0].area.as_deref(), Some("Bio"));
    }

    #[test]
    fn skips_empty_raw_files_and_reports_missing_results() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("empty.csv"), "").unwrap();

        let err = ResultAnalyzer::new(dir.path(), dir.path().join("out"))
            .load()
            .unwrap_err();
        assert!(matches!(err, BenchError::NoResults(_)));
    }

    #[test]
    fn batch_without_exam_column_joins_on_question_only() {
        let dir = tempdir().unwrap();
        let runs = dir.path().join("runs");
        std::fs::create_dir(&runs).unwrap();
        std::fs::write(
            runs.join("run.csv"),
            "questão,alternativa correta,alternativa escolhida pela ia,modelo,temperature used during test\n\
             q1,A,A,m,0\n\
             q2,B,C,m,0\n",
        )
        .unwrap();
        let input = dir.path().join("questions.csv");
        std::fs::write(
            &input,
            "vestibular,questão,area_conhecimento\nENEM,q1,Física\nFUVEST,q1,Química\nENEM,q2,Bio\n",
        )
        .unwrap();

        let analyzer = ResultAnalyzer::new(&runs, dir.path().join("out")).with_metadata_source(&input);
        let rows = analyzer.load().unwrap();
        let areas: Vec<_> = rows.iter().map(|r| r.area.as_deref()).collect();
        assert_eq!(areas, vec![Some("Física"), Some("Bio")]);

        let report = analyzer.generate_accuracy_report().unwrap();
        assert!(report.per_area.is_some());
    }

    #[test]
    fn metadata_source_overrides_areas() {
        let dir = tempdir().unwrap();
        let runs = dir.path().join("runs");
        std::fs::create_dir(&runs).unwrap();
        std::fs::write(
            runs.join("run.csv"),
            format!("{BATCH_HEADER}\nENEM,q1,A,Old,A,m,0\nFUVEST,q1,B,Old,C,m,0\nENEM,q9,C,Old,C,m,0\n"),
        )
        .unwrap();
        let input = dir.path().join("questions.csv");
        std::fs::write(
            &input,
            "vestibular,questão,eixo de conhecimento\nENEM,q1,Física\nFUVEST,q1,Química\n",
        )
        .unwrap();

        let rows = ResultAnalyzer::new(&runs, dir.path().join("out"))
            .with_metadata_source(&input)
            .load()
            .unwrap();

        let areas: Vec<_> = rows.iter().map(|r| r.area.clone()).collect();
        assert_eq!(
            areas,
            vec![Some("Física".to_string()), Some("Química".to_string()), None]
        );
    }
}
