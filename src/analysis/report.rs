use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::dataset::{safe_model_name, CsvTable};
use crate::error::BenchError;

use super::accuracy::{accuracy_by, ScoredRow};

/// Accuracy of one model at each temperature it was run with.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAccuracy {
    pub model: String,
    /// `(temperature, accuracy)`, ordered by temperature
    pub by_temperature: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExamAccuracy {
    pub exam: String,
    pub model: String,
    /// Mean over all temperatures
    pub accuracy: f64,
}

/// Knowledge area x model accuracy matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaPivot {
    pub models: Vec<String>,
    /// One entry per area; `None` where a model has no rows for that area
    pub rows: Vec<(String, Vec<Option<f64>>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    pub per_model: Vec<ModelAccuracy>,
    pub per_exam: Vec<ExamAccuracy>,
    pub per_area: Option<AreaPivot>,
    pub written: Vec<PathBuf>,
}

fn temperature_order(a: &str, b: &str) -> std::cmp::Ordering {
    let parse = |s: &str| s.parse::<f64>().unwrap_or(f64::MAX);
    parse(a).total_cmp(&parse(b)).then_with(|| a.cmp(b))
}

/// Batch-file model name with spaces also replaced.
fn safe_report_name(model: &str) -> String {
    safe_model_name(model).replace(' ', "_")
}

fn fmt_accuracy(value: f64) -> String {
    format!("{value:.4}")
}

impl AccuracyReport {
    pub fn from_rows(rows: &[ScoredRow]) -> Self {
        let mut per_model: BTreeMap<String, Vec<(String, f64)>> = BTreeMap::new();
        for ((model, temperature), acc) in
            accuracy_by(rows, |r| (r.model.clone(), r.temperature.clone()))
        {
            per_model.entry(model).or_default().push((temperature, acc));
        }
        let per_model = per_model
            .into_iter()
            .map(|(model, mut by_temperature)| {
                by_temperature.sort_by(|a, b| temperature_order(&a.0, &b.0));
                ModelAccuracy {
                    model,
                    by_temperature,
                }
            })
            .collect();

        let per_exam = accuracy_by(rows, |r| (r.exam.clone(), r.model.clone()))
            .into_iter()
            .map(|((exam, model), accuracy)| ExamAccuracy {
                exam,
                model,
                accuracy,
            })
            .collect();

        Self {
            per_model,
            per_exam,
            per_area: area_pivot(rows),
            written: Vec::new(),
        }
    }

    pub(super) fn with_written(mut self, written: Vec<PathBuf>) -> Self {
        self.written = written;
        self
    }

    /// Writes the report tables under `dir` and returns their paths.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>, BenchError> {
        let by_model_dir = dir.join("by_model");
        std::fs::create_dir_all(&by_model_dir)?;
        let mut written = Vec::new();

        for model in &self.per_model {
            let mut table = CsvTable::new(vec!["temperature".into(), "accuracy".into()]);
            table.rows = model
                .by_temperature
                .iter()
                .map(|(t, acc)| vec![t.clone(), fmt_accuracy(*acc)])
                .collect();
            let path = by_model_dir.join(format!("accuracy_{}.csv", safe_report_name(&model.model)));
            table.write(&path)?;
            written.push(path);
        }

        let mut exams = CsvTable::new(vec!["vestibular".into(), "modelo".into(), "accuracy".into()]);
        exams.rows = self
            .per_exam
            .iter()
            .map(|e| vec![e.exam.clone(), e.model.clone(), fmt_accuracy(e.accuracy)])
            .collect();
        let path = dir.join("benchmark_vestibular_model.csv");
        exams.write(&path)?;
        written.push(path);

        match &self.per_area {
            Some(pivot) => {
                let mut headers = vec!["area_conhecimento".to_string()];
                headers.extend(pivot.models.iter().cloned());
                let mut table = CsvTable::new(headers);
                table.rows = pivot
                    .rows
                    .iter()
                    .map(|(area, cells)| {
                        let mut row = vec![area.clone()];
                        row.extend(cells.iter().map(|c| c.map(fmt_accuracy).unwrap_or_default()));
                        row
                    })
                    .collect();
                let path = dir.join("heatmap_knowledge_area.csv");
                table.write(&path)?;
                written.push(path);
            }
            None => log::warn!("no knowledge-area information found; skipping area table"),
        }

        for path in &written {
            log::info!("report saved: {}", path.display());
        }
        Ok(written)
    }
}

fn area_pivot(rows: &[ScoredRow]) -> Option<AreaPivot> {
    let with_area: Vec<&ScoredRow> = rows.iter().filter(|r| r.area.is_some()).collect();
    if with_area.is_empty() {
        return None;
    }

    let mut tallies: BTreeMap<(String, String), (usize, usize)> = BTreeMap::new();
    let mut models = BTreeSet::new();
    for row in with_area {
        let area = row.area.clone().unwrap_or_default();
        models.insert(row.model.clone());
        let entry = tallies.entry((area, row.model.clone())).or_default();
        entry.0 += usize::from(row.is_correct);
        entry.1 += 1;
    }

    let models: Vec<String> = models.into_iter().collect();
    let areas: BTreeSet<&String> = tallies.keys().map(|(area, _)| area).collect();
    let rows = areas
        .into_iter()
        .map(|area| {
            let cells = models
                .iter()
                .map(|model| {
                    tallies
                        .get(&(area.clone(), model.clone()))
                        .map(|(hits, total)| *hits as f64 / *total as f64)
                })
                .collect();
            (area.clone(), cells)
        })
        .collect();

    Some(AreaPivot { models, rows })
}
