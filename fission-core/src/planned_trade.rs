use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::Side;

/// A rebalance step before it becomes an `Order`: the rebalancing
/// executor's planning phase emits these, and phases 2/4
/// turn them into broker submissions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedTrade {
    pub symbol: crate::Symbol,
    pub side: Side,
    pub qty: Decimal,
    pub estimated_value: Decimal,
    pub reason: String,
}
