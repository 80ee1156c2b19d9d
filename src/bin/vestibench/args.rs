use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use vestibench::config::BenchConfig;

#[derive(Parser, Debug)]
#[command(
    name = "vestibench",
    about = "Multiple-choice entrance-exam benchmark for LLMs"
)]
pub struct CliArgs {
    #[arg(long, value_enum, default_value_t = Mode::All)]
    pub mode: Mode,
    #[arg(long, short = 'm')]
    pub model: Option<String>,
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    #[arg(long)]
    pub analysis_dir: Option<PathBuf>,
    /// Comma-separated, e.g. `0,0.5,1`
    #[arg(long, value_delimiter = ',')]
    pub temperatures: Option<Vec<f32>>,
    #[arg(long)]
    pub workers: Option<usize>,
    /// Seconds between two model calls
    #[arg(long)]
    pub interval: Option<f64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    /// Query the model and write raw result batches
    Run,
    /// Re-derive answers in existing batches
    Clean,
    /// Build accuracy reports from existing batches
    Analyze,
    /// Run, then analyze
    All,
}

impl Mode {
    pub fn evaluates(self) -> bool {
        matches!(self, Self::Run | Self::All)
    }

    pub fn analyzes(self) -> bool {
        matches!(self, Self::Analyze | Self::All)
    }
}

impl CliArgs {
    /// Command-line flags take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut BenchConfig) -> anyhow::Result<()> {
        if let Some(model) = &self.model {
            config.run.model = model.clone();
        }
        if let Some(input) = &self.input {
            config.paths.input = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.raw_runs = dir.clone();
        }
        if let Some(dir) = &self.analysis_dir {
            config.paths.analysis = dir.clone();
        }
        if let Some(temps) = &self.temperatures {
            config.run.temperatures = temps.clone();
        }
        if let Some(workers) = self.workers {
            config.run.max_workers = workers;
        }
        if let Some(interval) = self.interval {
            config.run.request_interval_secs = interval;
        }

        if let Some(bad) = config
            .run
            .temperatures
            .iter()
            .find(|t| !(0.0..=1.0).contains(*t))
        {
            anyhow::bail!("temperature {bad} is outside [0, 1]");
        }
        if config.run.temperatures.is_empty() {
            anyhow::bail!("at least one temperature is required");
        }
        let interval = config.run.request_interval_secs;
        if !interval.is_finite() || interval < 0.0 {
            anyhow::bail!("request interval must be a finite, non-negative number of seconds");
        }
        config.run.request_interval()?;
        Ok(())
    }
}
