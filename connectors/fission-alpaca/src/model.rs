//! Wire-format structs for Alpaca's Trading and Market Data APIs. Only the
//! fields `fission-core`'s types need are modeled; everything else Alpaca
//! returns is ignored on deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaAccount {
    pub cash: Decimal,
    pub portfolio_value: Decimal,
    pub buying_power: Decimal,
    pub daytrade_count: u32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaPosition {
    pub symbol: String,
    pub qty: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub current_price: Decimal,
    pub unrealized_pl: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaClock {
    pub is_open: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaBar {
    pub t: String,
    pub o: Decimal,
    pub h: Decimal,
    pub l: Decimal,
    pub c: Decimal,
    pub v: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaBarsResponse {
    pub bars: Option<Vec<AlpacaBar>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaLatestQuote {
    pub ap: Decimal,
    pub bp: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaQuoteResponse {
    pub quote: Option<AlpacaLatestQuote>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaOrder {
    pub id: String,
    pub symbol: String,
    pub side: String,
    pub qty: Option<Decimal>,
    pub filled_qty: Decimal,
    #[serde(rename = "type")]
    pub order_type: String,
    pub limit_price: Option<Decimal>,
    pub time_in_force: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlpacaErrorBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewOrderRequest<'a> {
    pub symbol: &'a str,
    pub qty: String,
    pub side: &'a str,
    #[serde(rename = "type")]
    pub order_type: &'a str,
    pub time_in_force: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
}
