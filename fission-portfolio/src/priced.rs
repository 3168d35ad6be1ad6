use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fission_core::Symbol;
use fission_strategy::nuclear::NuclearEntry;

/// One nuclear constituent's allocation priced against a hypothetical
/// account value — a dashboard-facing view augmenting the raw weight map
/// with price/value/share figures. The rebalancer itself never consumes
/// this; it works entirely in weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricedNuclearEntry {
    pub symbol: Symbol,
    pub weight: Decimal,
    pub performance: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub shares: Decimal,
}

/// Prices a nuclear portfolio construction against `account_value`.
/// A symbol absent from `market_data` prices at zero and gets zero shares
/// rather than panicking — matching the rest of the workspace's "missing
/// data degrades, never raises" posture.
pub fn priced_nuclear_allocation(
    portfolio: &HashMap<Symbol, NuclearEntry>,
    market_data: &HashMap<Symbol, Decimal>,
    account_value: Decimal,
) -> Vec<PricedNuclearEntry> {
    portfolio
        .iter()
        .map(|(symbol, entry)| {
            let current_price = market_data.get(symbol).copied().unwrap_or(Decimal::ZERO);
            let market_value = account_value * entry.weight;
            let shares = if current_price > Decimal::ZERO {
                market_value / current_price
            } else {
                Decimal::ZERO
            };
            PricedNuclearEntry {
                symbol: symbol.clone(),
                weight: entry.weight,
                performance: entry.performance,
                current_price,
                market_value,
                shares,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn prices_allocation_against_account_value() {
        let mut portfolio = HashMap::new();
        portfolio.insert(
            "OKLO".to_string(),
            NuclearEntry { weight: dec!(0.5), performance: dec!(18) },
        );
        let mut market_data = HashMap::new();
        market_data.insert("OKLO".to_string(), dec!(50));

        let priced = priced_nuclear_allocation(&portfolio, &market_data, dec!(10000));
        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].market_value, dec!(5000));
        assert_eq!(priced[0].shares, dec!(100));
    }

    #[test]
    fn missing_price_yields_zero_shares() {
        let mut portfolio = HashMap::new();
        portfolio.insert(
            "OKLO".to_string(),
            NuclearEntry { weight: dec!(0.5), performance: dec!(18) },
        );
        let priced = priced_nuclear_allocation(&portfolio, &HashMap::new(), dec!(10000));
        assert_eq!(priced[0].current_price, Decimal::ZERO);
        assert_eq!(priced[0].shares, Decimal::ZERO);
    }
}
