use std::collections::BTreeMap;

/// One result row reduced to what the reports group on.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub model: String,
    /// Temperature as written in the batch (`0`, `0.5`, ...)
    pub temperature: String,
    pub exam: String,
    pub area: Option<String>,
    pub question: String,
    pub correct_answer: String,
    pub chosen: String,
    pub is_correct: bool,
}

impl ScoredRow {
    /// Normalizes both answers and scores the row.
    pub fn new(
        model: &str,
        temperature: &str,
        exam: &str,
        area: Option<String>,
        question: &str,
        correct_answer: &str,
        chosen: &str,
    ) -> Self {
        let correct_answer = normalize_answer(correct_answer);
        let chosen = normalize_answer(chosen);
        Self {
            model: model.to_string(),
            temperature: temperature.trim().to_string(),
            exam: exam.to_string(),
            area,
            question: question.to_string(),
            is_correct: !correct_answer.is_empty() && correct_answer == chosen,
            correct_answer,
            chosen,
        }
    }
}

pub fn normalize_answer(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Mean correctness per group key.
pub fn accuracy_by<K, F>(rows: &[ScoredRow], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&ScoredRow) -> K,
{
    let mut tallies: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for row in rows {
        let entry = tallies.entry(key(row)).or_default();
        entry.0 += usize::from(row.is_correct);
        entry.1 += 1;
    }
    tallies
        .into_iter()
        .map(|(k, (hits, total))| (k, hits as f64 / total as f64))
        .collect()
}
