use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use fission::EngineConfig;

use crate::engine::{self, SinkPaths};
use crate::{logging, run_loop};

/// Run the Fission multi-strategy trading engine.
#[derive(Parser, Debug)]
#[command(name = "fission-cli", version, about)]
struct Cli {
    /// Path to the TOML configuration file (layered under `FISSION_*`
    /// environment overrides).
    #[arg(long, default_value = "fission.toml", global = true)]
    config: String,

    /// Append-only alert log path.
    #[arg(long, default_value = "fission_alerts.jsonl", global = true)]
    alert_log: String,

    /// Append-only trade-execution log path.
    #[arg(long, default_value = "fission_trades.jsonl", global = true)]
    execution_log: String,

    /// Dashboard export path (overwritten once per tick).
    #[arg(long, default_value = "fission_dashboard.json", global = true)]
    dashboard: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate both strategies and rebalance toward the merged target once, then exit.
    RunOnce,
    /// Evaluate and rebalance on a fixed interval until stopped, per `EngineConfig::interval_minutes`.
    RunContinuous,
}

/// Parses arguments, installs the subscriber, loads configuration, builds
/// the engine, and dispatches to the requested command.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = EngineConfig::load(&cli.config).context("loading engine configuration")?;
    let sinks = SinkPaths {
        alert_log: cli.alert_log,
        execution_log: cli.execution_log,
        dashboard: cli.dashboard,
    };
    let engine = Arc::new(engine::build(&config, &sinks)?);

    match cli.command {
        Command::RunOnce => {
            let report = engine.run_tick().await.context("tick failed")?;
            tracing::info!(
                submitted = report.outcome.submitted.len(),
                skipped = report.outcome.skipped.len(),
                account_value = %report.outcome.account_value,
                "run-once complete"
            );
            Ok(())
        }
        Command::RunContinuous => run_loop::run(engine, config.interval(), config.max_errors).await,
    }
}
