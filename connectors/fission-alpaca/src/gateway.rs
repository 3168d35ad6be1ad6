use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use governor::Quota;
use nonzero_ext::nonzero;
use reqwest::{Client, Method, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::warn;

use fission_broker::{BrokerError, BrokerGateway, BrokerResult, RateLimiter};
use fission_core::{Account, Bar, BarSeries, Interval, Order, OrderStatus, OrderType, Period, Position, Quote, Side, Symbol, TimeInForce};

use crate::model::{AlpacaAccount, AlpacaBarsResponse, AlpacaClock, AlpacaErrorBody, AlpacaOrder, AlpacaPosition, AlpacaQuoteResponse, NewOrderRequest};

const PAPER_TRADING_HOST: &str = "https://paper-api.alpaca.markets";
const LIVE_TRADING_HOST: &str = "https://api.alpaca.markets";
const MARKET_DATA_HOST: &str = "https://data.alpaca.markets";

/// Alpaca's documented per-minute request cap for a standard account.
const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = nonzero!(200u32);

/// `BrokerGateway` over Alpaca's Trading API and Market Data API. Picks the
/// paper or live trading host from `paper_trading`; the data host is shared
/// by both.
pub struct AlpacaGateway {
    client: Client,
    trading_host: String,
    data_host: String,
    key_id: String,
    secret_key: String,
    limiter: RateLimiter,
}

impl AlpacaGateway {
    /// Credentials are taken as opaque strings — the caller is responsible
    /// for sourcing them (typically `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`).
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>, paper_trading: bool) -> Self {
        Self {
            client: Client::new(),
            trading_host: if paper_trading { PAPER_TRADING_HOST } else { LIVE_TRADING_HOST }.to_string(),
            data_host: MARKET_DATA_HOST.to_string(),
            key_id: key_id.into(),
            secret_key: secret_key.into(),
            limiter: RateLimiter::direct(Quota::per_minute(DEFAULT_REQUESTS_PER_MINUTE)),
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("APCA-API-KEY-ID", &self.key_id)
            .header("APCA-API-SECRET-KEY", &self.secret_key)
    }

    async fn get<T: DeserializeOwned>(&self, host: &str, path: &str, query: &[(&str, String)]) -> BrokerResult<T> {
        self.limiter.until_ready().await.map_err(|e| BrokerError::Request(e.to_string()))?;
        let url = format!("{host}{path}");
        let request = self.authed(self.client.request(Method::GET, &url).query(query));
        let response = request.send().await.map_err(|e| BrokerError::Request(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned>(&self, host: &str, path: &str, body: &impl serde::Serialize) -> BrokerResult<T> {
        self.limiter.until_ready().await.map_err(|e| BrokerError::Request(e.to_string()))?;
        let url = format!("{host}{path}");
        let request = self.authed(self.client.request(Method::POST, &url).json(body));
        let response = request.send().await.map_err(|e| BrokerError::Request(e.to_string()))?;
        Self::decode(response).await
    }

    async fn delete(&self, host: &str, path: &str) -> BrokerResult<()> {
        self.limiter.until_ready().await.map_err(|e| BrokerError::Request(e.to_string()))?;
        let url = format!("{host}{path}");
        let request = self.authed(self.client.request(Method::DELETE, &url));
        let response = request.send().await.map_err(|e| BrokerError::Request(e.to_string()))?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for_status(response).await)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BrokerResult<T> {
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(BrokerError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        response.json::<T>().await.map_err(|e| BrokerError::Request(e.to_string()))
    }

    async fn error_for_status(response: reqwest::Response) -> BrokerError {
        let status = response.status();
        let body = response.json::<AlpacaErrorBody>().await.map(|b| b.message).unwrap_or_else(|_| status.to_string());
        if status == StatusCode::NOT_FOUND {
            BrokerError::OrderNotFound(body)
        } else if status.is_client_error() {
            BrokerError::Rejected(body)
        } else {
            BrokerError::Request(body)
        }
    }
}

fn map_side(side: &str) -> Side {
    match side {
        "sell" => Side::Sell,
        _ => Side::Buy,
    }
}

fn side_str(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

fn map_order_type(order_type: &str) -> OrderType {
    match order_type {
        "limit" => OrderType::Limit,
        _ => OrderType::Market,
    }
}

fn map_status(status: &str) -> OrderStatus {
    match status {
        "filled" => OrderStatus::Filled,
        "partially_filled" => OrderStatus::PartiallyFilled,
        "canceled" | "pending_cancel" => OrderStatus::Canceled,
        "rejected" | "suspended" => OrderStatus::Rejected,
        "expired" | "done_for_day" => OrderStatus::Expired,
        _ => OrderStatus::Submitted,
    }
}

fn from_alpaca_order(order: AlpacaOrder) -> Order {
    Order {
        symbol: order.symbol,
        side: map_side(&order.side),
        qty: order.qty.unwrap_or(order.filled_qty),
        order_type: map_order_type(&order.order_type),
        limit_price: order.limit_price,
        time_in_force: TimeInForce::Day,
        broker_order_id: order.id,
        status: map_status(&order.status),
    }
}

/// Converts a lookback string like `"1y"`, `"6mo"`, `"1d"` into an ISO8601
/// start date Alpaca's bars endpoint accepts. Unrecognized suffixes fall
/// back to one year.
fn period_start(period: &Period) -> String {
    let spec = period.0.trim();
    let (digits, unit) = spec.split_at(spec.len().saturating_sub(if spec.ends_with("mo") { 2 } else { 1 }));
    let count: i64 = digits.parse().unwrap_or(1);
    let days = match unit {
        "d" => count,
        "mo" => count * 30,
        "y" => count * 365,
        _ => 365,
    };
    (Utc::now() - ChronoDuration::days(days)).format("%Y-%m-%d").to_string()
}

#[async_trait]
impl BrokerGateway for AlpacaGateway {
    async fn account(&self) -> BrokerResult<Account> {
        let account: AlpacaAccount = self.get(&self.trading_host, "/v2/account", &[]).await?;
        Ok(Account {
            portfolio_value: account.portfolio_value,
            cash: account.cash,
            buying_power: account.buying_power,
            day_trade_count: account.daytrade_count,
            status: account.status,
        })
    }

    async fn positions(&self) -> BrokerResult<HashMap<Symbol, Position>> {
        let positions: Vec<AlpacaPosition> = self.get(&self.trading_host, "/v2/positions", &[]).await?;
        Ok(positions
            .into_iter()
            .map(|p| {
                (
                    p.symbol.clone(),
                    Position {
                        symbol: p.symbol,
                        qty: p.qty,
                        market_value: p.market_value,
                        cost_basis: p.cost_basis,
                        current_price: p.current_price,
                        unrealized_pl: p.unrealized_pl,
                    },
                )
            })
            .collect())
    }

    async fn is_market_open(&self) -> BrokerResult<bool> {
        let clock: AlpacaClock = self.get(&self.trading_host, "/v2/clock", &[]).await?;
        Ok(clock.is_open)
    }

    async fn history(&self, symbol: &str, period: &Period, interval: Interval) -> BrokerResult<BarSeries> {
        let timeframe = match interval {
            Interval::Daily => "1Day",
        };
        let query = [
            ("timeframe", timeframe.to_string()),
            ("start", period_start(period)),
            ("limit", "10000".to_string()),
            ("adjustment", "split".to_string()),
        ];
        let response: AlpacaBarsResponse = self.get(&self.data_host, &format!("/v2/stocks/{symbol}/bars"), &query).await?;
        let bars = response.bars.unwrap_or_default();
        Ok(bars
            .into_iter()
            .filter_map(|b| {
                let timestamp = chrono::DateTime::parse_from_rfc3339(&b.t).ok()?.with_timezone(&Utc);
                Some(Bar {
                    timestamp,
                    open: b.o,
                    high: b.h,
                    low: b.l,
                    close: b.c,
                    volume: b.v,
                })
            })
            .collect())
    }

    async fn latest_quote(&self, symbol: &str) -> BrokerResult<Quote> {
        let response: AlpacaQuoteResponse = self.get(&self.data_host, &format!("/v2/stocks/{symbol}/quotes/latest"), &[]).await?;
        let quote = response.quote.ok_or_else(|| BrokerError::Request(format!("no quote available for {symbol}")))?;
        Ok(Quote {
            bid: quote.bp,
            ask: quote.ap,
            last: if quote.bp > Decimal::ZERO && quote.ap > Decimal::ZERO {
                (quote.bp + quote.ap) / Decimal::from(2)
            } else {
                quote.bp.max(quote.ap)
            },
        })
    }

    async fn submit_limit(&self, symbol: &str, qty: Decimal, side: Side, limit_price: Decimal, _tif: TimeInForce) -> BrokerResult<String> {
        let body = NewOrderRequest {
            symbol,
            qty: qty.to_string(),
            side: side_str(side),
            order_type: "limit",
            time_in_force: "day",
            limit_price: Some(limit_price.to_string()),
        };
        let order: AlpacaOrder = self.post(&self.trading_host, "/v2/orders", &body).await?;
        Ok(order.id)
    }

    async fn submit_market(&self, symbol: &str, qty: Decimal, side: Side, _tif: TimeInForce) -> BrokerResult<String> {
        let body = NewOrderRequest {
            symbol,
            qty: qty.to_string(),
            side: side_str(side),
            order_type: "market",
            time_in_force: "day",
            limit_price: None,
        };
        let order: AlpacaOrder = self.post(&self.trading_host, "/v2/orders", &body).await?;
        Ok(order.id)
    }

    async fn get_order(&self, order_id: &str) -> BrokerResult<Order> {
        let order: AlpacaOrder = self.get(&self.trading_host, &format!("/v2/orders/{order_id}"), &[]).await?;
        Ok(from_alpaca_order(order))
    }

    async fn cancel_order(&self, order_id: &str) -> BrokerResult<()> {
        self.delete(&self.trading_host, &format!("/v2/orders/{order_id}")).await
    }
}

/// Retries a fallible Alpaca call `attempts` times with a fixed delay,
/// used by callers that want extra resilience against transient 5xxs
/// beyond what `BrokerGateway`'s "treat failure as no data" contract gives
/// them for free. Not used internally; exposed for `fission-cli`.
pub async fn retrying<T, F, Fut>(attempts: u32, delay: Duration, mut call: F) -> BrokerResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = BrokerResult<T>>,
{
    let mut last_err = BrokerError::Request("no attempts made".to_string());
    for attempt in 0..attempts.max(1) {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(attempt, %err, "alpaca call failed, retrying");
                last_err = err;
                tokio::time::sleep(delay).await;
            }
        }
    }
    Err(last_err)
}
