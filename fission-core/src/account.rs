use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broker account snapshot. A failure to fetch this aborts the tick:
/// there is no meaningful rebalance without a portfolio value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub portfolio_value: Decimal,
    pub cash: Decimal,
    pub buying_power: Decimal,
    pub day_trade_count: u32,
    pub status: String,
}
