use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use fission_core::{ConsolidatedPortfolio, PlannedTrade, Position, Side, Symbol};

use crate::rounding::floor_6dp;

/// Monetary tolerance below which a symbol's current vs. target value is
/// considered "close enough" and no trade is planned.
pub const VALUE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 0); // 1.0 USD

/// Phase 1's output: sells and buys to submit, in that order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RebalancePlan {
    pub sells: Vec<PlannedTrade>,
    pub buys: Vec<PlannedTrade>,
}

impl RebalancePlan {
    pub fn is_empty(&self) -> bool {
        self.sells.is_empty() && self.buys.is_empty()
    }

    /// Sum of estimated sell proceeds — what phase 3 expects to land in
    /// cash once the sells settle.
    pub fn expected_proceeds(&self) -> Decimal {
        self.sells.iter().map(|t| t.estimated_value).sum()
    }
}

/// Phase 1 — Plan. Walks every symbol in either the live positions
/// or the target weights, computes `target_value - current_value`, and
/// turns a delta past `VALUE_TOLERANCE` into a planned sell or buy. Buys
/// are then scaled down, in proportion, if their total would exceed
/// projected cash (current cash plus the plan's own expected sell
/// proceeds) — the planner never assumes a sell fills at exactly its
/// estimate, but it does assume the proceeds arrive before the buys do.
///
/// `prices` is looked up per symbol; a symbol with no retrievable positive
/// price is skipped entirely, matching
/// the data model invariant that an executed buy always has a positive
/// current price.
pub fn plan_rebalance(
    positions: &HashMap<Symbol, Position>,
    targets: &ConsolidatedPortfolio,
    account_value: Decimal,
    cash: Decimal,
    prices: &HashMap<Symbol, Decimal>,
) -> RebalancePlan {
    let mut symbols: HashSet<&str> = HashSet::new();
    symbols.extend(positions.keys().map(String::as_str));
    symbols.extend(targets.weights.keys().map(String::as_str));

    let mut sells = Vec::new();
    let mut buys = Vec::new();

    // Stable order: positions first (in their map's iteration order is
    // unspecified, but we sort symbols so planning is deterministic and
    // reproducible across runs on identical input).
    let mut ordered: Vec<&str> = symbols.into_iter().collect();
    ordered.sort_unstable();

    for symbol in ordered {
        let weight = targets.weights.get(symbol).copied().unwrap_or(Decimal::ZERO);
        let target_value = account_value * weight;
        let position = positions.get(symbol);
        let current_value = position.map(|p| p.market_value).unwrap_or(Decimal::ZERO);
        let delta = current_value - target_value;

        let Some(price) = prices.get(symbol).copied().filter(|p| *p > Decimal::ZERO) else {
            continue;
        };

        if delta > VALUE_TOLERANCE {
            let held_qty = position.map(|p| p.qty).unwrap_or(Decimal::ZERO);
            let qty = floor_6dp((delta / price).min(held_qty));
            if qty > Decimal::ZERO {
                sells.push(PlannedTrade {
                    symbol: symbol.to_string(),
                    side: Side::Sell,
                    qty,
                    estimated_value: qty * price,
                    reason: format!("rebalance: reduce {symbol} toward target weight {weight}"),
                });
            }
        } else if delta < -VALUE_TOLERANCE {
            let value = -delta;
            let qty = floor_6dp(value / price);
            if qty > Decimal::ZERO {
                buys.push(PlannedTrade {
                    symbol: symbol.to_string(),
                    side: Side::Buy,
                    qty,
                    estimated_value: qty * price,
                    reason: format!("rebalance: raise {symbol} toward target weight {weight}"),
                });
            }
        }
    }

    let expected_proceeds: Decimal = sells.iter().map(|t| t.estimated_value).sum();
    let projected_cash = cash + expected_proceeds;
    let total_buy_value: Decimal = buys.iter().map(|t| t.estimated_value).sum();

    if total_buy_value > projected_cash && total_buy_value > Decimal::ZERO {
        let scale = projected_cash / total_buy_value;
        buys = buys
            .into_iter()
            .filter_map(|mut trade| {
                let price = prices.get(&trade.symbol).copied()?;
                let scaled_value = trade.estimated_value * scale;
                let qty = floor_6dp(scaled_value / price);
                if qty <= Decimal::ZERO {
                    return None;
                }
                trade.qty = qty;
                trade.estimated_value = qty * price;
                Some(trade)
            })
            .collect();
    }

    RebalancePlan { sells, buys }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(symbol: &str, qty: Decimal, price: Decimal) -> Position {
        Position {
            symbol: symbol.to_string(),
            qty,
            market_value: qty * price,
            cost_basis: qty * price,
            current_price: price,
            unrealized_pl: Decimal::ZERO,
        }
    }

    #[test]
    fn plans_a_sell_when_a_position_has_no_target_weight() {
        let mut positions = HashMap::new();
        positions.insert("X".to_string(), position("X", dec!(1), dec!(50)));
        let targets = ConsolidatedPortfolio::new(HashMap::new());
        let mut prices = HashMap::new();
        prices.insert("X".to_string(), dec!(50));

        let plan = plan_rebalance(&positions, &targets, dec!(100), dec!(10), &prices);
        assert_eq!(plan.sells.len(), 1);
        assert_eq!(plan.sells[0].qty, dec!(1));
        assert!(plan.buys.is_empty());
    }

    #[test]
    fn scenario_6_insufficient_cash_scales_the_buy() {
        // V=100, cash=10, positions={X: qty 1, mv 50,
        // price 50}, target={Y: 1.0}: the unscaled buy would need more
        // cash than is projected to be available, so it gets scaled down.
        let mut positions = HashMap::new();
        positions.insert("X".to_string(), position("X", dec!(1), dec!(50)));
        let mut weights = HashMap::new();
        weights.insert("Y".to_string(), dec!(1.0));
        let targets = ConsolidatedPortfolio::new(weights);
        let mut prices = HashMap::new();
        prices.insert("X".to_string(), dec!(50));
        prices.insert("Y".to_string(), dec!(25));

        let plan = plan_rebalance(&positions, &targets, dec!(100), dec!(10), &prices);
        assert_eq!(plan.sells.len(), 1);
        assert_eq!(plan.sells[0].estimated_value, dec!(50));

        assert_eq!(plan.buys.len(), 1);
        // target buy value is 100 (full target), but cash+proceeds = 60, so
        // the buy is scaled to 60 / 25 = 2.4 shares.
        assert_eq!(plan.buys[0].qty, dec!(2.4));
    }

    #[test]
    fn skips_symbols_with_no_retrievable_price() {
        let mut positions = HashMap::new();
        positions.insert("X".to_string(), position("X", dec!(1), dec!(50)));
        let targets = ConsolidatedPortfolio::new(HashMap::new());
        let plan = plan_rebalance(&positions, &targets, dec!(100), dec!(10), &HashMap::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn plan_is_idempotent_on_identical_input() {
        let mut positions = HashMap::new();
        positions.insert("X".to_string(), position("X", dec!(2), dec!(50)));
        let mut weights = HashMap::new();
        weights.insert("X".to_string(), dec!(0.25));
        weights.insert("Y".to_string(), dec!(0.5));
        let targets = ConsolidatedPortfolio::new(weights);
        let mut prices = HashMap::new();
        prices.insert("X".to_string(), dec!(50));
        prices.insert("Y".to_string(), dec!(20));

        let plan_a = plan_rebalance(&positions, &targets, dec!(1000), dec!(500), &prices);
        let plan_b = plan_rebalance(&positions, &targets, dec!(1000), dec!(500), &prices);
        assert_eq!(plan_a, plan_b);
    }

    #[test]
    fn never_buys_more_than_cash_plus_expected_proceeds() {
        let positions = HashMap::new();
        let mut weights = HashMap::new();
        weights.insert("A".to_string(), dec!(0.6));
        weights.insert("B".to_string(), dec!(0.6));
        let targets = ConsolidatedPortfolio::new(weights);
        let mut prices = HashMap::new();
        prices.insert("A".to_string(), dec!(10));
        prices.insert("B".to_string(), dec!(10));

        let plan = plan_rebalance(&positions, &targets, dec!(1000), dec!(50), &prices);
        let total_buy: Decimal = plan.buys.iter().map(|t| t.estimated_value).sum();
        assert!(total_buy <= dec!(50) + plan.expected_proceeds());
    }
}
