//! Facade crate: wires C1 through C7 into one tick of the Fission
//! trading engine and re-exports the pieces a binary needs to drive it.
//!
//! `Engine` owns exactly one broker, shared via `Arc` with its cached
//! market-data provider and its rebalancing executor, and exactly one
//! set of ledger sinks. A call to [`Engine::run_tick`] fetches history,
//! evaluates both strategies, merges their targets, rebalances toward
//! them, and records the outcome — nothing more, nothing less.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use fission_broker::BrokerGateway;
use fission_core::{Action, ConsolidatedPortfolio, SignalTarget, StrategySignal, Symbol};
use fission_data::{CachedMarketDataProvider, MarketDataProvider};
use fission_execution::{ExecutionError, ExecutionOutcome, PlacementParams, RebalancingExecutor};
use fission_ledger::{
    AlertRecord, AlertSink, DashboardExport, DashboardSink, ExecutedOrder, ExecutionLogSink,
    PortfolioSnapshot, StrategyDashboardEntry, TradeExecutionLogEntry,
};
use fission_portfolio::{ManagerError, StrategyManager, TickOutcome};

/// The single symbol a signal is best labeled by for alerting and the
/// dashboard: the symbol it names directly, the first weight in an
/// explicit weight map, or the strategy's own name for a named portfolio
/// (Nuclear's and TECL's named portfolios don't reduce to one symbol).
fn representative_symbol(signal: &StrategySignal, strategy: &'static str) -> Symbol {
    match &signal.target {
        SignalTarget::Symbol(symbol) => symbol.clone(),
        SignalTarget::Weights(weights) => weights
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| strategy.to_string()),
        SignalTarget::Named(_) => strategy.to_string(),
    }
}

/// Everything produced by one call to [`Engine::run_tick`], already
/// written to whichever sinks the engine was built with.
#[derive(Clone, Debug)]
pub struct TickReport {
    pub target: ConsolidatedPortfolio,
    pub nuclear_signal: StrategySignal,
    pub tecl_signal: StrategySignal,
    pub outcome: ExecutionOutcome,
}

/// Errors that abort a tick outright rather than degrading to a HOLD or
/// a skipped trade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("strategy manager misconfigured: {0}")]
    Manager(#[from] ManagerError),
    #[error("rebalance execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

/// C1-C7 wired into a single tick, generic over the broker connector.
/// `B` is shared via `Arc` with the cached market-data provider and the
/// executor, so a single `AlpacaGateway` (or `MockBroker`) underlies
/// every broker call this engine makes.
pub struct Engine<B: BrokerGateway + 'static> {
    market_data: Arc<CachedMarketDataProvider<B>>,
    manager: StrategyManager<CachedMarketDataProvider<B>>,
    executor: RebalancingExecutor<Arc<B>, Arc<CachedMarketDataProvider<B>>>,
    alert_sink: Arc<dyn AlertSink>,
    execution_log_sink: Arc<dyn ExecutionLogSink>,
    dashboard_sink: Arc<dyn DashboardSink>,
    paper_trading: bool,
}

/// The subset of `EngineConfig` the engine needs at construction time,
/// kept separate from `fission-config`'s type so this crate doesn't pull
/// in the config crate's TOML/env loading machinery just to read six
/// numbers out of it.
#[derive(Clone, Copy, Debug)]
pub struct EngineSettings {
    pub alpha_nuclear: Decimal,
    pub alpha_tecl: Decimal,
    pub top_n_nuclear: usize,
    pub cache_ttl: std::time::Duration,
    pub placement: PlacementParams,
    pub max_wait_time: std::time::Duration,
    pub paper_trading: bool,
}

impl<B: BrokerGateway + 'static> Engine<B> {
    pub fn new(
        broker: Arc<B>,
        settings: EngineSettings,
        alert_sink: Arc<dyn AlertSink>,
        execution_log_sink: Arc<dyn ExecutionLogSink>,
        dashboard_sink: Arc<dyn DashboardSink>,
    ) -> Result<Self, EngineError> {
        let market_data = Arc::new(CachedMarketDataProvider::with_ttl(broker.clone(), settings.cache_ttl));
        let manager = StrategyManager::new(
            market_data.clone(),
            settings.alpha_nuclear,
            settings.alpha_tecl,
            settings.top_n_nuclear,
        )?;
        let executor = RebalancingExecutor::new(broker, market_data.clone(), settings.placement, settings.max_wait_time);

        Ok(Self {
            market_data,
            manager,
            executor,
            alert_sink,
            execution_log_sink,
            dashboard_sink,
            paper_trading: settings.paper_trading,
        })
    }

    /// Drops every cached bar series regardless of TTL. Exposed for an
    /// operator-facing "force refresh" command; the engine itself never
    /// calls this on its own clock.
    pub fn clear_cache(&self) {
        self.market_data.clear_cache();
    }

    /// Runs one full tick: evaluate both strategies, merge their
    /// targets, rebalance the live account toward the merged target, and
    /// record the alert, trade-execution, and dashboard records. Returns
    /// an error only when the strategy manager is misconfigured or the
    /// account snapshot can't be fetched — every other failure degrades
    /// to a HOLD signal or a skipped trade and still produces a report.
    pub async fn run_tick(&self) -> Result<TickReport, EngineError> {
        let TickOutcome {
            target,
            nuclear_signal,
            tecl_signal,
        } = self.manager.run_tick().await;

        self.record_alerts(&nuclear_signal, "nuclear");
        self.record_alerts(&tecl_signal, "tecl");

        let outcome = self.executor.run(&target).await?;

        self.record_execution_log(&target, &outcome);
        self.record_dashboard(&target, &nuclear_signal, &tecl_signal, &outcome);

        info!(
            submitted = outcome.submitted.len(),
            skipped = outcome.skipped.len(),
            account_value = %outcome.account_value,
            "tick complete"
        );

        Ok(TickReport {
            target,
            nuclear_signal,
            tecl_signal,
            outcome,
        })
    }

    fn record_alerts(&self, signal: &StrategySignal, strategy: &'static str) {
        if signal.action == Action::Hold {
            return;
        }
        let symbol = representative_symbol(signal, strategy);
        let price = signal.market_data.get(&symbol).copied().unwrap_or(Decimal::ZERO);
        let record = AlertRecord {
            timestamp: Utc::now(),
            symbol,
            action: signal.action,
            price,
            reason: signal.reason.clone(),
        };
        if let Err(err) = self.alert_sink.record(&record) {
            warn!(%err, strategy, "failed to record alert");
        }
    }

    fn record_execution_log(&self, target: &ConsolidatedPortfolio, outcome: &ExecutionOutcome) {
        let orders = outcome
            .submitted
            .iter()
            .map(|submitted| ExecutedOrder {
                symbol: submitted.trade.symbol.clone(),
                side: submitted.trade.side,
                qty: submitted.trade.qty,
                order_id: submitted.broker_order_id.clone(),
                estimated_value: submitted.trade.estimated_value,
            })
            .collect();
        let entry = TradeExecutionLogEntry::new(Utc::now(), outcome.account_value, target.clone(), orders, self.paper_trading);
        if let Err(err) = self.execution_log_sink.record(&entry) {
            error!(%err, "failed to record trade execution log entry");
        }
    }

    fn record_dashboard(
        &self,
        target: &ConsolidatedPortfolio,
        nuclear_signal: &StrategySignal,
        tecl_signal: &StrategySignal,
        outcome: &ExecutionOutcome,
    ) {
        let mut export = DashboardExport::new(if self.paper_trading { "paper" } else { "live" }, true);
        export.portfolio = PortfolioSnapshot {
            total_value: outcome.account_value,
            cash: Decimal::ZERO,
            equity: outcome.account_value,
            daily_pl: Decimal::ZERO,
            daily_pl_percent: Decimal::ZERO,
        };
        export.recent_trades = outcome
            .submitted
            .iter()
            .map(|submitted| ExecutedOrder {
                symbol: submitted.trade.symbol.clone(),
                side: submitted.trade.side,
                qty: submitted.trade.qty,
                order_id: submitted.broker_order_id.clone(),
                estimated_value: submitted.trade.estimated_value,
            })
            .collect();
        export.signals.insert(
            "nuclear".to_string(),
            serde_json::to_value(nuclear_signal).unwrap_or(serde_json::Value::Null),
        );
        export.signals.insert(
            "tecl".to_string(),
            serde_json::to_value(tecl_signal).unwrap_or(serde_json::Value::Null),
        );
        for (name, signal) in [("nuclear", nuclear_signal), ("tecl", tecl_signal)] {
            let symbol = representative_symbol(signal, name);
            let allocation = target.weights.get(&symbol).copied().unwrap_or(Decimal::ZERO);
            export.strategies.insert(
                name.to_string(),
                StrategyDashboardEntry {
                    signal: format!("{:?}", signal.action),
                    symbol,
                    reason: signal.reason.clone(),
                    allocation,
                },
            );
        }

        if let Err(err) = self.dashboard_sink.publish(&export) {
            warn!(%err, "failed to publish dashboard export");
        }
    }
}

pub use fission_broker::{BrokerError, BrokerResult};
pub use fission_config::{broker_credential, ConfigError, EngineConfig};
pub use fission_data::DEFAULT_PERIOD;
pub use fission_execution::SubmittedOrder;

#[cfg(test)]
mod tests {
    use super::*;
    use fission_test_utils::MockBroker;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct NullSink;
    impl AlertSink for NullSink {
        fn record(&self, _alert: &AlertRecord) -> fission_ledger::LedgerResult<()> {
            Ok(())
        }
    }
    impl ExecutionLogSink for NullSink {
        fn record(&self, _entry: &TradeExecutionLogEntry) -> fission_ledger::LedgerResult<()> {
            Ok(())
        }
    }
    impl DashboardSink for NullSink {
        fn publish(&self, _export: &DashboardExport) -> fission_ledger::LedgerResult<()> {
            Ok(())
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            alpha_nuclear: dec!(0.6),
            alpha_tecl: dec!(0.4),
            top_n_nuclear: 3,
            cache_ttl: std::time::Duration::from_secs(900),
            placement: PlacementParams::default(),
            max_wait_time: std::time::Duration::from_secs(1),
            paper_trading: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_tick_produces_a_report_against_a_mock_broker() {
        let broker = Arc::new(MockBroker::new().with_account(dec!(10_000), dec!(10_000)).fills_limit_orders_immediately());
        let sinks: Arc<dyn AlertSink> = Arc::new(NullSink);
        let exec_sink: Arc<dyn ExecutionLogSink> = Arc::new(NullSink);
        let dash_sink: Arc<dyn DashboardSink> = Arc::new(NullSink);

        let engine = Engine::new(broker, settings(), sinks, exec_sink, dash_sink).unwrap();
        let report = engine.run_tick().await.unwrap();
        assert!(report.outcome.account_value >= Decimal::ZERO);
    }

    #[test]
    fn rejects_misconfigured_allocations() {
        let broker = Arc::new(MockBroker::new().with_account(dec!(10_000), dec!(10_000)));
        let mut bad = settings();
        bad.alpha_nuclear = dec!(0.5);
        bad.alpha_tecl = dec!(0.3);
        let sinks: Arc<dyn AlertSink> = Arc::new(NullSink);
        let exec_sink: Arc<dyn ExecutionLogSink> = Arc::new(NullSink);
        let dash_sink: Arc<dyn DashboardSink> = Arc::new(NullSink);
        let result = Engine::new(broker, bad, sinks, exec_sink, dash_sink);
        assert!(result.is_err());
    }
}
