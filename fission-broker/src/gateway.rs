use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use fission_core::{Account, BarSeries, Order, Period, Position, Quote, Side, Symbol, TimeInForce};

use crate::error::BrokerResult;

/// The eight operations every broker connector must implement. All
/// are fallible; per the data model and error design most
/// failures are absorbed by the caller rather than propagated, but the
/// trait itself surfaces a `Result` so each caller can decide how.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Account snapshot. A failure here aborts the tick — there is no
    /// meaningful rebalance without a portfolio value.
    async fn account(&self) -> BrokerResult<Account>;

    /// Current open positions, keyed by symbol.
    async fn positions(&self) -> BrokerResult<std::collections::HashMap<Symbol, Position>>;

    /// Whether the market is currently open.
    async fn is_market_open(&self) -> BrokerResult<bool>;

    /// Fetch OHLCV history for `symbol` over `period` at `interval`.
    async fn history(
        &self,
        symbol: &str,
        period: &Period,
        interval: fission_core::Interval,
    ) -> BrokerResult<BarSeries>;

    /// Latest top-of-book quote for `symbol`.
    async fn latest_quote(&self, symbol: &str) -> BrokerResult<Quote>;

    /// Submit a DAY limit order, returning the broker's order id.
    async fn submit_limit(
        &self,
        symbol: &str,
        qty: Decimal,
        side: Side,
        limit_price: Decimal,
        tif: TimeInForce,
    ) -> BrokerResult<String>;

    /// Submit a DAY market order, returning the broker's order id.
    async fn submit_market(
        &self,
        symbol: &str,
        qty: Decimal,
        side: Side,
        tif: TimeInForce,
    ) -> BrokerResult<String>;

    /// Fetch an order's current status and fields.
    async fn get_order(&self, order_id: &str) -> BrokerResult<Order>;

    /// Cancel an open order.
    async fn cancel_order(&self, order_id: &str) -> BrokerResult<()>;
}

/// Lets one broker instance be shared (via `Arc`) between the cached
/// market-data provider and the rebalancing executor without requiring
/// every connector to implement `Clone` itself.
#[async_trait]
impl<T: BrokerGateway + ?Sized> BrokerGateway for Arc<T> {
    async fn account(&self) -> BrokerResult<Account> {
        (**self).account().await
    }

    async fn positions(&self) -> BrokerResult<std::collections::HashMap<Symbol, Position>> {
        (**self).positions().await
    }

    async fn is_market_open(&self) -> BrokerResult<bool> {
        (**self).is_market_open().await
    }

    async fn history(&self, symbol: &str, period: &Period, interval: fission_core::Interval) -> BrokerResult<BarSeries> {
        (**self).history(symbol, period, interval).await
    }

    async fn latest_quote(&self, symbol: &str) -> BrokerResult<Quote> {
        (**self).latest_quote(symbol).await
    }

    async fn submit_limit(&self, symbol: &str, qty: Decimal, side: Side, limit_price: Decimal, tif: TimeInForce) -> BrokerResult<String> {
        (**self).submit_limit(symbol, qty, side, limit_price, tif).await
    }

    async fn submit_market(&self, symbol: &str, qty: Decimal, side: Side, tif: TimeInForce) -> BrokerResult<String> {
        (**self).submit_market(symbol, qty, side, tif).await
    }

    async fn get_order(&self, order_id: &str) -> BrokerResult<Order> {
        (**self).get_order(order_id).await
    }

    async fn cancel_order(&self, order_id: &str) -> BrokerResult<()> {
        (**self).cancel_order(order_id).await
    }
}
