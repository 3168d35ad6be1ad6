use std::time::Duration;

use rust_decimal::Decimal;
use tracing::info;

use fission_broker::BrokerGateway;
use fission_core::{ConsolidatedPortfolio, PlannedTrade, Side};
use fission_data::MarketDataProvider;

use crate::error::{ExecutionError, ExecutionResult};
use crate::order_placement::{place_order, PlacementParams};
use crate::plan::plan_rebalance;
use crate::settlement::{available_cash_without_settlement, wait_for_settlement};

/// One submitted order as the executor reports it back to the caller for
/// logging.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedOrder {
    pub trade: PlannedTrade,
    pub broker_order_id: String,
}

/// The full record of one rebalancing tick — what ran, what was skipped,
/// and the account value it was sized against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionOutcome {
    pub account_value: Decimal,
    pub submitted: Vec<SubmittedOrder>,
    pub skipped: Vec<PlannedTrade>,
}

/// C7: the rebalancing executor. Owns a broker and a market-data
/// provider and runs the four-phase rebalance given a target portfolio.
pub struct RebalancingExecutor<B, M> {
    broker: B,
    market_data: M,
    params: PlacementParams,
    max_wait_time: Duration,
}

impl<B, M> RebalancingExecutor<B, M>
where
    B: BrokerGateway,
    M: MarketDataProvider,
{
    pub fn new(broker: B, market_data: M, params: PlacementParams, max_wait_time: Duration) -> Self {
        Self {
            broker,
            market_data,
            params,
            max_wait_time,
        }
    }

    /// Runs phases 1 through 4 against `targets`. Aborts with
    /// [`ExecutionError::AccountUnavailable`] if the account snapshot can't
    /// be fetched.
    pub async fn run(&self, targets: &ConsolidatedPortfolio) -> ExecutionResult<ExecutionOutcome> {
        let account = self.broker.account().await.map_err(ExecutionError::AccountUnavailable)?;
        let positions = self.broker.positions().await.unwrap_or_default();

        let mut symbols: Vec<String> = positions.keys().cloned().collect();
        for symbol in targets.weights.keys() {
            if !symbols.contains(symbol) {
                symbols.push(symbol.clone());
            }
        }
        let mut prices = std::collections::HashMap::new();
        for symbol in &symbols {
            if let Some(price) = self.market_data.current_price(symbol).await {
                prices.insert(symbol.clone(), price);
            }
        }

        let plan = plan_rebalance(&positions, targets, account.portfolio_value, account.cash, &prices);
        info!(sells = plan.sells.len(), buys = plan.buys.len(), "rebalance plan computed");

        // Phase 2 — execute sells.
        let mut submitted = Vec::new();
        let mut skipped = Vec::new();
        let mut sell_order_ids = Vec::new();
        for trade in &plan.sells {
            match place_order(&self.broker, &self.market_data, &trade.symbol, trade.qty, Side::Sell, self.params).await {
                Some(order_id) => {
                    sell_order_ids.push(order_id.clone());
                    submitted.push(SubmittedOrder {
                        trade: trade.clone(),
                        broker_order_id: order_id,
                    });
                }
                None => skipped.push(trade.clone()),
            }
        }

        // Phase 3 — wait for settlement, unless the market's closed and
        // we're told to ignore hours, in which case estimated proceeds
        // stand in for refreshed cash.
        let market_open = self.broker.is_market_open().await.unwrap_or(false);
        let available_cash = if !market_open && self.params.ignore_market_hours {
            available_cash_without_settlement(account.cash, plan.expected_proceeds())
        } else {
            wait_for_settlement(&self.broker, &sell_order_ids, self.params.poll_interval, self.max_wait_time).await;
            self.broker
                .account()
                .await
                .map(|refreshed| refreshed.cash)
                .unwrap_or(account.cash)
        };

        // Phase 4 — execute buys, stopping each one that would exceed the
        // cash remaining after the ones before it.
        let mut remaining_cash = available_cash;
        for trade in &plan.buys {
            if trade.estimated_value > remaining_cash {
                skipped.push(trade.clone());
                continue;
            }
            match place_order(&self.broker, &self.market_data, &trade.symbol, trade.qty, Side::Buy, self.params).await {
                Some(order_id) => {
                    remaining_cash -= trade.estimated_value;
                    submitted.push(SubmittedOrder {
                        trade: trade.clone(),
                        broker_order_id: order_id,
                    });
                }
                None => skipped.push(trade.clone()),
            }
        }

        Ok(ExecutionOutcome {
            account_value: account.portfolio_value,
            submitted,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_test_utils::MockBroker;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[tokio::test(start_paused = true)]
    async fn empty_target_and_positions_produce_no_orders() {
        let broker = MockBroker::new().with_account(dec!(1000), dec!(1000));
        let executor = RebalancingExecutor::new(broker.clone(), broker, PlacementParams::default(), Duration::from_secs(1));
        let targets = ConsolidatedPortfolio::new(HashMap::new());
        let outcome = executor.run(&targets).await.unwrap();
        assert!(outcome.submitted.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rebalance_submits_sell_before_buy() {
        let broker = MockBroker::new()
            .with_account(dec!(1000), dec!(500))
            .with_price("X", dec!(50))
            .with_price("Y", dec!(25))
            .with_position("X", dec!(2), dec!(50))
            .fills_limit_orders_immediately();
        let mut weights = HashMap::new();
        weights.insert("Y".to_string(), dec!(0.05));
        let targets = ConsolidatedPortfolio::new(weights);

        let executor = RebalancingExecutor::new(broker.clone(), broker, PlacementParams::default(), Duration::from_secs(1));
        let outcome = executor.run(&targets).await.unwrap();

        assert!(outcome.submitted.iter().any(|o| o.trade.symbol == "X" && o.trade.side == Side::Sell));
        assert!(outcome.submitted.iter().any(|o| o.trade.symbol == "Y" && o.trade.side == Side::Buy));
        let sell_index = outcome.submitted.iter().position(|o| o.trade.side == Side::Sell).unwrap();
        let buy_index = outcome.submitted.iter().position(|o| o.trade.side == Side::Buy).unwrap();
        assert!(sell_index < buy_index);
    }

    #[tokio::test(start_paused = true)]
    async fn account_fetch_failure_aborts_the_tick() {
        let broker = MockBroker::new().failing_account();
        let executor = RebalancingExecutor::new(broker.clone(), broker, PlacementParams::default(), Duration::from_secs(1));
        let targets = ConsolidatedPortfolio::cash_fallback();
        let result = executor.run(&targets).await;
        assert!(result.is_err());
    }
}
