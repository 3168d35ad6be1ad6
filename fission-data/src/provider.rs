use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use fission_core::{BarSeries, Interval, Period, Symbol};

/// C1: fetch OHLCV history and the latest current price, never raising —
/// a fetch failure degrades to an empty series or `None`, and
/// downstream strategy/indicator code is required to tolerate that.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Returns the requested history, or an empty series on any failure.
    async fn history(&self, symbol: &Symbol, period: &Period, interval: Interval) -> BarSeries;

    /// Returns the broker mid-quote, or `None` if it can't be determined.
    async fn current_price(&self, symbol: &Symbol) -> Option<Decimal>;
}

/// Lets one cached provider be shared (via `Arc`) between the strategy
/// manager and the rebalancing executor.
#[async_trait]
impl<T: MarketDataProvider + ?Sized> MarketDataProvider for Arc<T> {
    async fn history(&self, symbol: &Symbol, period: &Period, interval: Interval) -> BarSeries {
        (**self).history(symbol, period, interval).await
    }

    async fn current_price(&self, symbol: &Symbol) -> Option<Decimal> {
        (**self).current_price(symbol).await
    }
}

/// Default daily-bar lookback the strategy manager fetches per tick.
/// Nuclear's 90-day momentum ranking and 90-day volatility window both
/// need at least this much history; TECL's KMLM switcher needs far less,
/// but one shared period keeps a single cache key scheme simple.
pub const DEFAULT_PERIOD: &str = "1y";

/// TTL cache key: entries are cached per (symbol, period, interval) and
/// evicted by TTL expiry only — no background sweep, just a lazy check
/// on read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub symbol: Symbol,
    pub period: Period,
    pub interval: Interval,
}

/// Default TTL applied when the caller doesn't override `cache_duration`.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(900);
