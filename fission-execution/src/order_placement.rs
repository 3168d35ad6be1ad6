use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use fission_broker::BrokerGateway;
use fission_core::{OrderStatus, Side, TimeInForce};
use fission_data::MarketDataProvider;

use crate::rounding::round2;

/// Tunables for `place_order` and the settlement wait, surfaced here rather than read from `fission-config` directly so
/// the executor stays decoupled from the config crate's types.
#[derive(Clone, Copy, Debug)]
pub struct PlacementParams {
    pub max_retries: u32,
    pub poll_timeout: Duration,
    pub poll_interval: Duration,
    pub slippage_bps: Decimal,
    pub ignore_market_hours: bool,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            max_retries: 3,
            poll_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            slippage_bps: Decimal::new(3, 1), // 0.3
            ignore_market_hours: false,
        }
    }
}

/// Submits `qty` shares of `symbol` on `side`, widening
/// the limit price on each retry, falling back to a market order once
/// retries are exhausted. Returns the broker order id, or `None` if the
/// order could never be placed (zero/negative qty, market closed and
/// `ignore_market_hours` is false, no retrievable price, or every attempt
/// including the market-order fallback failed).
pub async fn place_order<B, M>(
    broker: &B,
    market_data: &M,
    symbol: &str,
    qty: Decimal,
    side: Side,
    params: PlacementParams,
) -> Option<String>
where
    B: BrokerGateway,
    M: MarketDataProvider,
{
    if qty <= Decimal::ZERO {
        return None;
    }

    let market_open = broker.is_market_open().await.unwrap_or(false);
    if !market_open {
        if params.ignore_market_hours {
            return match broker.submit_market(symbol, qty, side, TimeInForce::Day).await {
                Ok(id) => {
                    info!(%symbol, %qty, ?side, "submitted market order while market closed");
                    Some(id)
                }
                Err(err) => {
                    warn!(%symbol, error = %err, "market order failed while market closed");
                    None
                }
            };
        }
        debug!(%symbol, "market closed, skipping order");
        return None;
    }

    let mut slippage = params.slippage_bps;
    for attempt in 0..params.max_retries {
        let Some(price) = market_data.current_price(&symbol.to_string()).await else {
            debug!(%symbol, "no current price, aborting order placement");
            return None;
        };
        if price <= Decimal::ZERO {
            return None;
        }

        let offset = price * slippage / Decimal::from(100);
        let limit = round2(price + Decimal::from(side.sign()) * offset);

        let order_id = match broker.submit_limit(symbol, qty, side, limit, TimeInForce::Day).await {
            Ok(id) => id,
            Err(err) => {
                warn!(%symbol, attempt, error = %err, "limit order submission failed, retrying");
                slippage *= Decimal::from(2);
                continue;
            }
        };

        if let Some(status) = poll_until_terminal(broker, &order_id, params.poll_timeout, params.poll_interval).await {
            match status {
                OrderStatus::Filled => {
                    info!(%symbol, %order_id, attempt, "limit order filled");
                    return Some(order_id);
                }
                OrderStatus::Canceled | OrderStatus::Rejected | OrderStatus::Expired => {
                    debug!(%symbol, %order_id, ?status, attempt, "order not filled, retrying with wider slippage");
                }
                _ => {
                    let _ = broker.cancel_order(&order_id).await;
                    debug!(%symbol, %order_id, attempt, "poll timeout, cancelled and retrying");
                }
            }
        } else {
            let _ = broker.cancel_order(&order_id).await;
        }

        slippage *= Decimal::from(2);
    }

    warn!(%symbol, "limit retries exhausted, falling back to market order");
    match broker.submit_market(symbol, qty, side, TimeInForce::Day).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(%symbol, error = %err, "market order fallback failed");
            None
        }
    }
}

/// Polls `GetOrder` every `poll_interval` until the status is terminal or
/// `poll_timeout` elapses. Returns `None` only on a timeout with the order
/// still unread as non-terminal; an unreadable order (a `GetOrder` error)
/// is treated as terminal-unknown and reported as `Expired` so the caller
/// cancels and retries rather than looping forever on a dead id.
async fn poll_until_terminal<B: BrokerGateway>(
    broker: &B,
    order_id: &str,
    poll_timeout: Duration,
    poll_interval: Duration,
) -> Option<OrderStatus> {
    let deadline = tokio::time::Instant::now() + poll_timeout;
    loop {
        match broker.get_order(order_id).await {
            Ok(order) if order.status.is_terminal() => return Some(order.status),
            Ok(_) => {}
            Err(err) => {
                debug!(%order_id, error = %err, "order status unreadable, treating as settled");
                return Some(OrderStatus::Canceled);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(poll_interval.min(deadline.saturating_duration_since(tokio::time::Instant::now()))).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_test_utils::MockBroker;
    use rust_decimal_macros::dec;

    #[tokio::test(start_paused = true)]
    async fn qty_at_or_below_zero_returns_none() {
        let broker = MockBroker::new();
        let id = place_order(&broker, &broker, "SPY", dec!(0), Side::Buy, PlacementParams::default()).await;
        assert!(id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn market_closed_without_ignore_flag_returns_none() {
        let broker = MockBroker::new().with_market_open(false);
        let id = place_order(&broker, &broker, "SPY", dec!(1), Side::Buy, PlacementParams::default()).await;
        assert!(id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn market_closed_with_ignore_flag_submits_market_order() {
        let broker = MockBroker::new().with_market_open(false);
        let params = PlacementParams {
            ignore_market_hours: true,
            ..Default::default()
        };
        let id = place_order(&broker, &broker, "SPY", dec!(1), Side::Buy, params).await;
        assert!(id.is_some());
        assert!(broker.submitted_market_orders() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_limit_fill_returns_its_id() {
        let broker = MockBroker::new().with_price("SPY", dec!(100)).fills_limit_orders_immediately();
        let id = place_order(&broker, &broker, "SPY", dec!(1), Side::Buy, PlacementParams::default()).await;
        assert!(id.is_some());
        assert!(broker.order_exists(id.as_deref().unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fall_back_to_market_order() {
        let broker = MockBroker::new().with_price("SPY", dec!(100)).never_fills_limit_orders();
        let params = PlacementParams {
            max_retries: 2,
            poll_timeout: Duration::from_millis(10),
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let id = place_order(&broker, &broker, "SPY", dec!(1), Side::Buy, params).await;
        assert!(id.is_some());
        assert_eq!(broker.submitted_market_orders(), 1);
    }
}
