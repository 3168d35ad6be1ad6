use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use fission_broker::BrokerGateway;
use fission_core::{BarSeries, Interval, Period, Symbol};

use crate::provider::{CacheKey, MarketDataProvider, DEFAULT_CACHE_TTL};

struct CacheEntry {
    fetched_at: Instant,
    series: BarSeries,
}

/// Wraps a `BrokerGateway`, caching bar history per `(symbol, period,
/// interval)` with a TTL and deriving current price from the broker's
/// latest quote. Every failure is absorbed here — logged via
/// `tracing` and degraded to an empty series or `None` — so this is the
/// one place in the workspace a broker error stops propagating outward.
pub struct CachedMarketDataProvider<B: BrokerGateway> {
    broker: Arc<B>,
    ttl: Duration,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<B: BrokerGateway> CachedMarketDataProvider<B> {
    pub fn new(broker: Arc<B>) -> Self {
        Self::with_ttl(broker, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(broker: Arc<B>, ttl: Duration) -> Self {
        Self {
            broker,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drops every cached entry regardless of TTL. The engine never calls
    /// this itself — eviction is lazy and TTL-only — but tests and
    /// an operator-facing "force refresh" command need a way to reset it.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

#[async_trait]
impl<B: BrokerGateway> MarketDataProvider for CachedMarketDataProvider<B> {
    async fn history(&self, symbol: &Symbol, period: &Period, interval: Interval) -> BarSeries {
        let key = CacheKey {
            symbol: symbol.clone(),
            period: period.clone(),
            interval,
        };

        if let Some(entry) = self.cache.lock().get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                return entry.series.clone();
            }
        }

        match self.broker.history(symbol, period, interval).await {
            Ok(series) => {
                self.cache.lock().insert(
                    key,
                    CacheEntry {
                        fetched_at: Instant::now(),
                        series: series.clone(),
                    },
                );
                series
            }
            Err(err) => {
                warn!(%symbol, error = %err, "history fetch failed, returning empty series");
                BarSeries::new()
            }
        }
    }

    async fn current_price(&self, symbol: &Symbol) -> Option<Decimal> {
        match self.broker.latest_quote(symbol).await {
            Ok(quote) => quote.mid(),
            Err(err) => {
                debug!(%symbol, error = %err, "quote fetch failed, no current price");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use fission_broker::BrokerResult;
    use fission_core::{Account, Bar, Order, Position, Quote, Side, TimeInForce};
    use rust_decimal_macros::dec;

    /// Minimal `BrokerGateway` stub: only `history` and `latest_quote`
    /// matter here, counted so tests can assert cache hits skip them.
    struct StubBroker {
        history_calls: AtomicUsize,
        bars: Decimal,
    }

    impl StubBroker {
        fn new(close: Decimal) -> Self {
            Self {
                history_calls: AtomicUsize::new(0),
                bars: close,
            }
        }
    }

    #[async_trait]
    impl BrokerGateway for StubBroker {
        async fn account(&self) -> BrokerResult<Account> {
            unimplemented!()
        }

        async fn positions(&self) -> BrokerResult<StdHashMap<Symbol, Position>> {
            unimplemented!()
        }

        async fn is_market_open(&self) -> BrokerResult<bool> {
            Ok(true)
        }

        async fn history(&self, _symbol: &str, _period: &Period, _interval: Interval) -> BrokerResult<BarSeries> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Bar {
                timestamp: Utc::now(),
                open: self.bars,
                high: self.bars,
                low: self.bars,
                close: self.bars,
                volume: dec!(1000),
            }])
        }

        async fn latest_quote(&self, _symbol: &str) -> BrokerResult<Quote> {
            Ok(Quote {
                bid: dec!(99.5),
                ask: dec!(100.5),
                last: dec!(100),
            })
        }

        async fn submit_limit(
            &self,
            _symbol: &str,
            _qty: Decimal,
            _side: Side,
            _limit_price: Decimal,
            _tif: TimeInForce,
        ) -> BrokerResult<String> {
            unimplemented!()
        }

        async fn submit_market(
            &self,
            _symbol: &str,
            _qty: Decimal,
            _side: Side,
            _tif: TimeInForce,
        ) -> BrokerResult<String> {
            unimplemented!()
        }

        async fn get_order(&self, _order_id: &str) -> BrokerResult<Order> {
            unimplemented!()
        }

        async fn cancel_order(&self, _order_id: &str) -> BrokerResult<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_refetch() {
        let broker = Arc::new(StubBroker::new(dec!(42)));
        let provider = CachedMarketDataProvider::with_ttl(broker.clone(), Duration::from_secs(60));

        let period = Period::new("1y");
        let first = provider.history(&"SPY".to_string(), &period, Interval::Daily).await;
        let second = provider.history(&"SPY".to_string(), &period, Interval::Daily).await;

        assert_eq!(first, second);
        assert_eq!(broker.history_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ttl_expiry_triggers_refetch() {
        let broker = Arc::new(StubBroker::new(dec!(42)));
        let provider = CachedMarketDataProvider::with_ttl(broker.clone(), Duration::from_millis(1));

        let period = Period::new("1y");
        provider.history(&"SPY".to_string(), &period, Interval::Daily).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        provider.history(&"SPY".to_string(), &period, Interval::Daily).await;

        assert_eq!(broker.history_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn current_price_uses_quote_mid() {
        let broker = Arc::new(StubBroker::new(dec!(42)));
        let provider = CachedMarketDataProvider::new(broker);
        let price = provider.current_price(&"SPY".to_string()).await;
        assert_eq!(price, Some(dec!(100.0)));
    }
}
