//! C1: the market-data provider — fetch OHLCV history and
//! the latest current price, TTL-cached, never raising.

mod cache;
mod provider;

pub use cache::CachedMarketDataProvider;
pub use provider::{MarketDataProvider, DEFAULT_CACHE_TTL, DEFAULT_PERIOD};
