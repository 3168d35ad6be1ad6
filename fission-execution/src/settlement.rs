use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use fission_broker::BrokerGateway;

/// Phase 3 — Wait for settlement. Polls every submitted sell order
/// id at `poll_interval` until each reaches a terminal status or
/// `max_wait_time` elapses overall. An order whose status can't be read
/// (a `GetOrder` error) is treated as settled rather than polled forever.
///
/// Returns once every order is terminal or the deadline passes, whichever
/// is first — the caller proceeds to the buy phase regardless.
pub async fn wait_for_settlement<B: BrokerGateway>(
    broker: &B,
    order_ids: &[String],
    poll_interval: Duration,
    max_wait_time: Duration,
) {
    if order_ids.is_empty() {
        return;
    }

    let deadline = tokio::time::Instant::now() + max_wait_time;
    let mut remaining: Vec<String> = order_ids.to_vec();
    loop {
        let mut still_pending = Vec::with_capacity(remaining.len());
        for id in remaining {
            match broker.get_order(&id).await {
                Ok(order) if order.status.is_terminal() => {
                    debug!(order_id = %id, status = ?order.status, "sell order settled");
                }
                Ok(_) => still_pending.push(id),
                Err(err) => {
                    debug!(order_id = %id, error = %err, "order status unreadable, treating as settled");
                }
            }
        }
        remaining = still_pending;

        if remaining.is_empty() {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(remaining = remaining.len(), "settlement wait timed out, proceeding with refreshed cash");
            return;
        }
        let left = deadline.saturating_duration_since(tokio::time::Instant::now());
        tokio::time::sleep(poll_interval.min(left)).await;
    }
}

/// The market-closed short-circuit: when the market is closed
/// and `ignore_market_hours` is set, the broker won't update cash for
/// unfilled orders, so the executor sizes the buy phase off estimated
/// proceeds instead of waiting and refreshing.
pub fn available_cash_without_settlement(cash: Decimal, expected_proceeds: Decimal) -> Decimal {
    cash + expected_proceeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_test_utils::MockBroker;

    #[tokio::test(start_paused = true)]
    async fn returns_immediately_when_no_orders_pending() {
        let broker = MockBroker::new();
        wait_for_settlement(&broker, &[], Duration::from_secs(1), Duration::from_secs(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn stops_polling_once_order_reaches_terminal_status() {
        let broker = MockBroker::new().with_price("SPY", rust_decimal_macros::dec!(100)).fills_limit_orders_immediately();
        let id = broker.submit_limit_for_test("SPY", rust_decimal_macros::dec!(1), fission_core::Side::Sell, rust_decimal_macros::dec!(100));
        wait_for_settlement(&broker, &[id], Duration::from_millis(10), Duration::from_secs(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_proceeds_when_order_never_settles() {
        let broker = MockBroker::new().with_price("SPY", rust_decimal_macros::dec!(100)).never_fills_limit_orders();
        let id = broker.submit_limit_for_test("SPY", rust_decimal_macros::dec!(1), fission_core::Side::Sell, rust_decimal_macros::dec!(100));
        let start = tokio::time::Instant::now();
        wait_for_settlement(&broker, &[id], Duration::from_millis(5), Duration::from_millis(30)).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn market_closed_cash_uses_estimate_not_refresh() {
        assert_eq!(
            available_cash_without_settlement(rust_decimal_macros::dec!(10), rust_decimal_macros::dec!(50)),
            rust_decimal_macros::dec!(60)
        );
    }
}
