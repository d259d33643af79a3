#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod commands;

use args::Args;
use clap::Parser;
use promptline_config::Config;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    promptline_telemetry::init(Some(&config.telemetry), &args.log)?;

    tracing::debug!(
        config_path = ?args.config,
        rules = config.templates.len(),
        "configuration loaded"
    );

    let output = commands::run(&config, args.command)?;
    println!("{output}");

    Ok(())
}
