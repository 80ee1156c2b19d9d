mod commands;

use clap::Parser;

use vestibench::config::{load_config, warn_if_no_credentials};

use crate::args::{CliArgs, Mode};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let loaded = load_config(args.config.clone())?;
    let mut config = loaded.config;
    args.apply_overrides(&mut config)?;
    let _logger = init_logging(&config.logging)?;

    match &loaded.source {
        Some(path) => log::info!("config loaded from {}", path.display()),
        None => log::info!("no config file found; using defaults"),
    }

    if args.mode.evaluates() {
        warn_if_no_credentials(&config.provider);
        commands::evaluate(&config).await?;
    }
    if args.mode == Mode::Clean {
        commands::clean(&config)?;
    }
    if args.mode.analyzes() {
        commands::analyze(&config)?;
    }
    Ok(())
}
