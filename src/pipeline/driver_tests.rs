use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::{tempdir, TempDir};

use super::{EvaluationDriver, RateLimiter, RowOutcome};
use crate::dataset::{columns, CsvTable, QuestionSet};
use crate::error::{BenchError, InvokeError};
use crate::invoker::{Completion, ModelInvoker};

#[derive(Clone)]
enum Reply {
    Text(&'static str),
    Fail,
    Panic,
    After(u64, &'static str),
}

#[derive(Default)]
struct ScriptedInvoker {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    finished: Mutex<Vec<String>>,
    dispatched: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedInvoker {
    fn new(replies: &[(&str, Reply)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .iter()
                .map(|(q, r)| (q.to_string(), r.clone()))
                .collect(),
            ..Default::default()
        })
    }
}

fn question_of(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Questão: "))
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        _temperature: f32,
    ) -> Result<Completion, InvokeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dispatched.lock().unwrap().push(tokio::time::Instant::now());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let question = question_of(prompt);
        let reply = self.replies.get(&question).cloned().unwrap_or(Reply::Text("A"));
        let text = match reply {
            Reply::Text(text) => Ok(text),
            Reply::After(ms, text) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(text)
            }
            Reply::Fail => Err(InvokeError::Provider("model exploded".into())),
            Reply::Panic => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("worker blew up on {question}");
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().unwrap().push(question);
        text.map(|content| Completion {
            content: content.to_string(),
            model: model.to_string(),
            usage: None,
        })
    }
}

fn write_questions(dir: &Path, texts: &[&str]) -> PathBuf {
    let mut table = CsvTable::new(
        [
            "vestibular",
            "questão",
            "alternativa_a",
            "alternativa_b",
            "alternativa_c",
            "alternativa_d",
            "alternativa_e",
            "alternativa_correta",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );
    for text in texts {
        table.rows.push(
            ["FUVEST", text, "a", "b", "c", "d", "e", "A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
    }
    let path = dir.join("questions.csv");
    table.write(&path).unwrap();
    path
}

fn driver(invoker: Arc<ScriptedInvoker>, out: &TempDir) -> EvaluationDriver {
    EvaluationDriver::new(invoker, Arc::new(RateLimiter::new(Duration::ZERO)), "org/stub-model")
        .temperatures(vec![0.0])
        .output_dir(out.path().join("raw_runs"))
}

#[tokio::test]
async fn answer_empty_and_error_rows_keep_their_positions() {
    let dir = tempdir().unwrap();
    let input = write_questions(dir.path(), &["q0", "q1", "q2"]);
    let invoker = ScriptedInvoker::new(&[
        ("q0", Reply::Text("A")),
        ("q1", Reply::Text("")),
        ("q2", Reply::Fail),
    ]);

    let written = driver(invoker, &dir).run(&input).await.unwrap();

    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("raw_runs/vestibench_org-stub-model_t0.csv"));
    let table = CsvTable::read(&written[0]).unwrap();
    assert_eq!(table.len(), 3);

    let chosen = table.column(columns::CHOSEN).unwrap();
    let raw = table.column(columns::RAW_RESPONSE).unwrap();
    let answers: Vec<_> = (0..3).map(|r| table.get(r, chosen)).collect();
    assert_eq!(answers, vec!["A", "!EMPTY!", "!ERROR!"]);
    assert!(table.get(2, raw).contains("model exploded"));
    assert_eq!(table.get(0, table.column(columns::MODEL).unwrap()), "org/stub-model");
    assert_eq!(table.get(1, table.column(columns::TEMPERATURE).unwrap()), "0");
    assert_eq!(table.get(2, table.column(columns::QUESTION).unwrap()), "q2");
}

#[tokio::test]
async fn one_batch_per_temperature_each_with_every_row() {
    let dir = tempdir().unwrap();
    let texts: Vec<String> = (0..7).map(|i| format!("q{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let input = write_questions(dir.path(), &refs);
    let invoker = ScriptedInvoker::new(&[]);

    let written = driver(invoker.clone(), &dir)
        .temperatures(vec![0.0, 0.5, 1.0])
        .run(&input)
        .await
        .unwrap();

    assert_eq!(written.len(), 3);
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 21);
    for (path, temp) in written.iter().zip(["0", "0.5", "1"]) {
        let table = CsvTable::read(path).unwrap();
        assert_eq!(table.len(), 7);
        let q = table.column(columns::QUESTION).unwrap();
        let t = table.column(columns::TEMPERATURE).unwrap();
        for row in 0..7 {
            assert_eq!(table.get(row, q), format!("q{row}"));
            assert_eq!(table.get(row, t), temp);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn output_order_ignores_completion_order() {
    let dir = tempdir().unwrap();
    let texts: Vec<String> = (0..6).map(|i| format!("q{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let input = write_questions(dir.path(), &refs);
    let letters = ["A", "B", "C", "D", "E", "A"];
    let replies: Vec<(&str, Reply)> = refs
        .iter()
        .enumerate()
        .map(|(i, q)| (*q, Reply::After((6 - i as u64) * 100, letters[i])))
        .collect();
    let invoker = ScriptedInvoker::new(&replies);

    let questions = QuestionSet::load(&input).unwrap();
    let results = driver(invoker.clone(), &dir)
        .max_workers(6)
        .evaluate_temperature(&questions, 0.0)
        .await;

    let finished = invoker.finished.lock().unwrap().clone();
    assert_eq!(finished, vec!["q5", "q4", "q3", "q2", "q1", "q0"]);
    let rows: Vec<_> = results.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![0, 1, 2, 3, 4, 5]);
    let labels: Vec<_> = results.iter().map(|r| r.outcome.label()).collect();
    assert_eq!(labels, letters);
}

#[tokio::test(start_paused = true)]
async fn concurrency_never_exceeds_worker_count() {
    let dir = tempdir().unwrap();
    let texts: Vec<String> = (0..12).map(|i| format!("q{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let input = write_questions(dir.path(), &refs);
    let replies: Vec<(&str, Reply)> = refs.iter().map(|q| (*q, Reply::After(50, "B"))).collect();
    let invoker = ScriptedInvoker::new(&replies);

    let questions = QuestionSet::load(&input).unwrap();
    let results = driver(invoker.clone(), &dir)
        .max_workers(3)
        .evaluate_temperature(&questions, 0.5)
        .await;

    assert_eq!(results.len(), 12);
    assert!(invoker.max_in_flight.load(Ordering::SeqCst) <= 3);
    assert!(results.iter().all(|r| r.outcome == RowOutcome::Answered("B".into())));
}

#[tokio::test]
async fn panicking_worker_becomes_fatal_row() {
    let dir = tempdir().unwrap();
    let input = write_questions(dir.path(), &["ok", "boom", "fine"]);
    let invoker = ScriptedInvoker::new(&[("boom", Reply::Panic), ("fine", Reply::Text("e"))]);

    let questions = QuestionSet::load(&input).unwrap();
    let results = driver(invoker, &dir)
        .evaluate_temperature(&questions, 1.0)
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].outcome.label(), "A");
    assert_eq!(results[1].outcome.label(), "FATAL_ERROR");
    assert!(results[1].raw_response.contains("worker blew up on boom"));
    assert_eq!(results[1].elapsed_secs, 0.0);
    assert_eq!(results[2].outcome.label(), "E");
}

#[tokio::test]
async fn missing_input_aborts_before_any_request() {
    let dir = tempdir().unwrap();
    let invoker = ScriptedInvoker::new(&[]);

    let err = driver(invoker.clone(), &dir)
        .run(&dir.path().join("absent.csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::InputNotFound(_)));
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("raw_runs").exists());
}

#[tokio::test]
async fn progress_reports_every_completion() {
    let dir = tempdir().unwrap();
    let input = write_questions(dir.path(), &["a", "b", "c", "d"]);
    let invoker = ScriptedInvoker::new(&[]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let questions = QuestionSet::load(&input).unwrap();
    driver(invoker, &dir)
        .on_progress(move |temp, done, total| sink.lock().unwrap().push((temp, done, total)))
        .evaluate_temperature(&questions, 0.5)
        .await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![(0.5, 1, 4), (0.5, 2, 4), (0.5, 3, 4), (0.5, 4, 4)]);
}

#[tokio::test(start_paused = true)]
async fn one_limiter_spaces_calls_across_workers_and_temperatures() {
    let dir = tempdir().unwrap();
    let texts: Vec<String> = (0..5).map(|i| format!("q{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let input = write_questions(dir.path(), &refs);
    let replies: Vec<(&str, Reply)> = refs.iter().map(|q| (*q, Reply::After(300, "C"))).collect();
    let invoker = ScriptedInvoker::new(&replies);
    let interval = Duration::from_secs(2);
    let start = tokio::time::Instant::now();

    let written = EvaluationDriver::new(
        invoker.clone(),
        Arc::new(RateLimiter::new(interval)),
        "org/stub-model",
    )
    .temperatures(vec![0.0, 0.5, 1.0])
    .max_workers(4)
    .output_dir(dir.path().join("raw_runs"))
    .run(&input)
    .await
    .unwrap();

    assert_eq!(written.len(), 3);
    let mut dispatched = invoker.dispatched.lock().unwrap().clone();
    assert_eq!(dispatched.len(), 15);
    dispatched.sort();
    for pair in dispatched.windows(2) {
        assert!(pair[1] - pair[0] >= interval, "calls {:?} apart", pair[1] - pair[0]);
    }
    assert!(dispatched[14] - start >= interval * 14);
}
