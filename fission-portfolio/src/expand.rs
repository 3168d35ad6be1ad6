use std::collections::HashMap;

use rust_decimal::Decimal;

use fission_core::{IndicatorSet, NamedPortfolio, SignalTarget, Symbol, WeightMap};
use fission_strategy::nuclear;

/// Expands a strategy signal's target into a concrete weight
/// map. Plain symbols become a 100% allocation; explicit weight maps pass
/// through; named portfolios are expanded by calling back into
/// `fission-strategy`'s construction functions with the same indicators
/// and return history the signal itself was computed from.
pub fn expand_signal(
    target: &SignalTarget,
    indicators: &HashMap<Symbol, IndicatorSet>,
    daily_returns: &HashMap<Symbol, Vec<Decimal>>,
    top_n_nuclear: usize,
) -> WeightMap {
    match target {
        SignalTarget::Symbol(symbol) => {
            let mut weights = WeightMap::new();
            weights.insert(symbol.clone(), Decimal::ONE);
            weights
        }
        SignalTarget::Weights(weights) => weights.clone(),
        SignalTarget::Named(NamedPortfolio::NuclearPortfolio) => {
            nuclear::nuclear_portfolio(indicators, daily_returns, top_n_nuclear)
                .into_iter()
                .map(|(symbol, entry)| (symbol, entry.weight))
                .collect()
        }
        SignalTarget::Named(NamedPortfolio::UvxyBtalPortfolio) => {
            let mut weights = WeightMap::new();
            weights.insert("UVXY".to_string(), Decimal::new(75, 2));
            weights.insert("BTAL".to_string(), Decimal::new(25, 2));
            weights
        }
        SignalTarget::Named(NamedPortfolio::BearPortfolio) => {
            nuclear::bear_combined_weights(indicators, daily_returns).unwrap_or_else(|| {
                // Documented fallback when the
                // combination's weight map can't be reconstructed.
                let mut weights = WeightMap::new();
                weights.insert("SQQQ".to_string(), Decimal::new(6, 1));
                weights.insert("TQQQ".to_string(), Decimal::new(4, 1));
                weights
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn plain_symbol_expands_to_full_weight() {
        let weights = expand_signal(
            &SignalTarget::Symbol("UVXY".to_string()),
            &HashMap::new(),
            &HashMap::new(),
            3,
        );
        assert_eq!(weights.get("UVXY"), Some(&Decimal::ONE));
    }

    #[test]
    fn uvxy_btal_portfolio_expands_to_75_25() {
        let weights = expand_signal(
            &SignalTarget::Named(NamedPortfolio::UvxyBtalPortfolio),
            &HashMap::new(),
            &HashMap::new(),
            3,
        );
        assert_eq!(weights.get("UVXY"), Some(&dec!(0.75)));
        assert_eq!(weights.get("BTAL"), Some(&dec!(0.25)));
    }

    #[test]
    fn bear_portfolio_falls_back_when_returns_unavailable() {
        let weights = expand_signal(
            &SignalTarget::Named(NamedPortfolio::BearPortfolio),
            &HashMap::new(),
            &HashMap::new(),
            3,
        );
        assert_eq!(weights.get("SQQQ"), Some(&dec!(0.6)));
        assert_eq!(weights.get("TQQQ"), Some(&dec!(0.4)));
    }
}
