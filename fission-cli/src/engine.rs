use std::sync::Arc;

use anyhow::{Context, Result};

use fission::{broker_credential, Engine, EngineConfig, EngineSettings};
use fission_alpaca::AlpacaGateway;
use fission_execution::PlacementParams;
use fission_ledger::{AlertSink, DashboardSink, ExecutionLogSink, FileDashboardSink, JsonLinesAlertSink, JsonLinesExecutionLogSink};

/// Where the engine's ledger sinks write. Every field is a plain file
/// path; the CLI resolves them from flags before construction.
pub struct SinkPaths {
    pub alert_log: String,
    pub execution_log: String,
    pub dashboard: String,
}

/// Reads the Alpaca credentials an `AlpacaGateway` needs from the
/// environment, failing fast rather than constructing a gateway that
/// would reject every request with an auth error.
fn alpaca_credentials() -> Result<(String, String)> {
    let key_id = broker_credential("APCA_API_KEY_ID").context("APCA_API_KEY_ID is not set")?;
    let secret_key = broker_credential("APCA_API_SECRET_KEY").context("APCA_API_SECRET_KEY is not set")?;
    Ok((key_id, secret_key))
}

fn placement_params(config: &EngineConfig) -> PlacementParams {
    PlacementParams {
        max_retries: config.max_retries,
        poll_timeout: config.poll_timeout(),
        poll_interval: config.poll_interval(),
        slippage_bps: config.slippage_bps,
        ignore_market_hours: config.ignore_market_hours,
    }
}

/// Builds an `Engine<AlpacaGateway>` wired from loaded configuration,
/// environment credentials, and the file-backed ledger sinks teacher's
/// connectors use by default.
pub fn build(config: &EngineConfig, sinks: &SinkPaths) -> Result<Engine<AlpacaGateway>> {
    let (key_id, secret_key) = alpaca_credentials()?;
    let broker = Arc::new(AlpacaGateway::new(key_id, secret_key, config.paper_trading));

    let settings = EngineSettings {
        alpha_nuclear: config.alpha_nuclear(),
        alpha_tecl: config.alpha_tecl(),
        top_n_nuclear: config.top_n_nuclear,
        cache_ttl: config.cache_duration(),
        placement: placement_params(config),
        max_wait_time: config.max_wait_time(),
        paper_trading: config.paper_trading,
    };

    let alert_sink: Arc<dyn AlertSink> = Arc::new(JsonLinesAlertSink::open(&sinks.alert_log).context("opening alert log")?);
    let execution_log_sink: Arc<dyn ExecutionLogSink> =
        Arc::new(JsonLinesExecutionLogSink::open(&sinks.execution_log).context("opening trade-execution log")?);
    let dashboard_sink: Arc<dyn DashboardSink> = Arc::new(FileDashboardSink::new(&sinks.dashboard));

    Engine::new(broker, settings, alert_sink, execution_log_sink, dashboard_sink).context("constructing engine")
}
