use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A live position as reported by the broker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: crate::Symbol,
    pub qty: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub current_price: Decimal,
    pub unrealized_pl: Decimal,
}
