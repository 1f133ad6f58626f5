#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `chlorine`: command-line front end for the chlorine dose optimizer.

mod cli;
mod error_fmt;
mod logging;
mod optimize;

use std::path::Path;

use chlorine_config::{Config, ModelCfg};
use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::exit_code_for_error;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        tracing::debug!(error = ?err, "command failed");
        optimize::report_failure(&err, json);
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = load_config(cli.config.as_deref())?;
    cfg.validate().wrap_err("invalid configuration")?;
    logging::init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    let model = cli
        .model_dir
        .as_deref()
        .map_or_else(|| cfg.model.clone(), ModelCfg::in_dir);
    tracing::debug!(?model, "artifact paths");

    match cli.cmd {
        Commands::Optimize {
            reading,
            sweep,
            trace,
        } => optimize::run_optimize(&cfg, &model, &reading, &sweep, trace, cli.json),
        Commands::Batch { readings, workers } => {
            optimize::run_batch_cmd(&cfg, &model, &readings, workers, cli.json)
        }
        Commands::SelfCheck => optimize::self_check(&cfg, &model, cli.json),
    }
}

/// Read and parse the TOML config; without `--config` every section takes its defaults.
fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    chlorine_config::load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))
}
