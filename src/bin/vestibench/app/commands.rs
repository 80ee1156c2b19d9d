use std::sync::Arc;

use anyhow::Context;

use vestibench::analysis::ResultAnalyzer;
use vestibench::cleaner::clean_directory;
use vestibench::config::BenchConfig;
use vestibench::invoker::{ModelInvoker, OpenAICompatible, ResilientInvoker};
use vestibench::{EvaluationDriver, RateLimiter};

use crate::ui::{print_clean_summary, print_report, TemperatureProgress};

pub async fn evaluate(config: &BenchConfig) -> anyhow::Result<()> {
    let provider = &config.provider;
    let transport =
        OpenAICompatible::new(&provider.base_url, provider.api_key(), provider.timeout_seconds)
            .with_context(|| format!("invalid provider url {}", provider.base_url))?;
    let invoker: Arc<dyn ModelInvoker> = Arc::new(ResilientInvoker::new(
        Box::new(transport),
        config.retry.clone(),
    ));
    let limiter = Arc::new(RateLimiter::new(config.run.request_interval()?));

    log::info!(
        "evaluating {} with {} workers, {:?} between calls",
        config.run.model,
        config.run.max_workers,
        limiter.interval()
    );

    let progress = Arc::new(TemperatureProgress::new());
    let sink = progress.clone();
    let driver = EvaluationDriver::new(invoker, limiter, config.run.model.as_str())
        .temperatures(config.run.temperatures.clone())
        .max_workers(config.run.max_workers)
        .output_dir(&config.paths.raw_runs)
        .on_progress(move |temperature, done, total| sink.update(temperature, done, total));

    let written = driver.run(&config.paths.input).await;
    progress.finish();
    for path in written? {
        println!("saved {}", path.display());
    }
    Ok(())
}

pub fn clean(config: &BenchConfig) -> anyhow::Result<()> {
    let dir = &config.paths.raw_runs;
    let summary = clean_directory(dir)
        .with_context(|| format!("cannot read result directory {}", dir.display()))?;
    print_clean_summary(&summary);
    Ok(())
}

pub fn analyze(config: &BenchConfig) -> anyhow::Result<()> {
    let report = ResultAnalyzer::new(&config.paths.raw_runs, &config.paths.analysis)
        .with_metadata_source(&config.paths.input)
        .generate_accuracy_report()?;
    print_report(&report);
    Ok(())
}
