use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fission_core::{ConsolidatedPortfolio, Side, Symbol};

use crate::error::LedgerResult;
use crate::jsonl::JsonLinesWriter;

/// One order as recorded in the trade-execution log, after submission:
/// `{symbol, side, qty, order_id, estimated_value}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutedOrder {
    pub symbol: Symbol,
    pub side: Side,
    pub qty: Decimal,
    pub order_id: String,
    pub estimated_value: Decimal,
}

/// Derived counts and totals over a tick's executed orders: buy/sell
/// order counts and net trading value alongside the raw order list, so an
/// operator can read the outcome of a tick without recomputing it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_trades: usize,
    pub buy_orders: usize,
    pub sell_orders: usize,
    pub total_buy_value: Decimal,
    pub total_sell_value: Decimal,
    pub net_trading_value: Decimal,
}

impl ExecutionSummary {
    pub fn from_orders(orders: &[ExecutedOrder]) -> Self {
        let mut summary = ExecutionSummary {
            total_trades: orders.len(),
            ..Default::default()
        };
        for order in orders {
            match order.side {
                Side::Buy => {
                    summary.buy_orders += 1;
                    summary.total_buy_value += order.estimated_value;
                }
                Side::Sell => {
                    summary.sell_orders += 1;
                    summary.total_sell_value += order.estimated_value;
                }
            }
        }
        summary.net_trading_value = summary.total_sell_value - summary.total_buy_value;
        summary
    }
}

/// One line of the append-only trade-execution log: `{timestamp,
/// account_value, target_portfolio, orders_executed, paper_trading}`,
/// plus the derived `summary` supplement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeExecutionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub account_value: Decimal,
    pub target_portfolio: ConsolidatedPortfolio,
    pub orders_executed: Vec<ExecutedOrder>,
    pub paper_trading: bool,
    pub summary: ExecutionSummary,
}

impl TradeExecutionLogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        account_value: Decimal,
        target_portfolio: ConsolidatedPortfolio,
        orders_executed: Vec<ExecutedOrder>,
        paper_trading: bool,
    ) -> Self {
        let summary = ExecutionSummary::from_orders(&orders_executed);
        Self {
            timestamp,
            account_value,
            target_portfolio,
            orders_executed,
            paper_trading,
            summary,
        }
    }
}

/// Sink a tick's trade-execution record is written through.
pub trait ExecutionLogSink: Send + Sync {
    fn record(&self, entry: &TradeExecutionLogEntry) -> LedgerResult<()>;
}

/// Default `ExecutionLogSink`: appends one JSON line per tick to a file.
pub struct JsonLinesExecutionLogSink {
    writer: JsonLinesWriter,
}

impl JsonLinesExecutionLogSink {
    pub fn open(path: impl AsRef<std::path::Path>) -> LedgerResult<Self> {
        Ok(Self {
            writer: JsonLinesWriter::open(path)?,
        })
    }
}

impl ExecutionLogSink for JsonLinesExecutionLogSink {
    fn record(&self, entry: &TradeExecutionLogEntry) -> LedgerResult<()> {
        self.writer.append_line(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(side: Side, value: Decimal) -> ExecutedOrder {
        ExecutedOrder {
            symbol: "SPY".to_string(),
            side,
            qty: dec!(1),
            order_id: "ord-1".to_string(),
            estimated_value: value,
        }
    }

    #[test]
    fn summary_counts_and_nets_buy_and_sell_value() {
        let orders = vec![
            order(Side::Sell, dec!(100)),
            order(Side::Buy, dec!(40)),
            order(Side::Buy, dec!(20)),
        ];
        let summary = ExecutionSummary::from_orders(&orders);
        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.buy_orders, 2);
        assert_eq!(summary.sell_orders, 1);
        assert_eq!(summary.total_buy_value, dec!(60));
        assert_eq!(summary.total_sell_value, dec!(100));
        assert_eq!(summary.net_trading_value, dec!(40));
    }

    #[test]
    fn empty_orders_yield_zeroed_summary() {
        let summary = ExecutionSummary::from_orders(&[]);
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.net_trading_value, Decimal::ZERO);
    }
}
