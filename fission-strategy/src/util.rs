use std::collections::HashMap;

use rust_decimal::Decimal;

use fission_core::{IndicatorSet, Symbol};

/// The neutral `IndicatorSet` substituted for a symbol the caller never
/// computed indicators for (no history was fetched for it this tick). RSI
/// fields sit at the fallback midpoint; price/MA/return fields sit at zero
/// so a bull-regime check (`current_price > ma_200`) reads false rather
/// than tripping on an arbitrary default — the conservative reading when a
/// symbol's data is simply unavailable.
pub(crate) fn neutral_indicators() -> IndicatorSet {
    IndicatorSet {
        rsi_9: Decimal::from(50),
        rsi_10: Decimal::from(50),
        rsi_20: Decimal::from(50),
        ma_20: Decimal::ZERO,
        ma_200: Decimal::ZERO,
        ma_return_90: Decimal::ZERO,
        cum_return_60: Decimal::ZERO,
        current_price: Decimal::ZERO,
    }
}

/// Looks up `symbol`'s indicators, substituting the neutral default when
/// the symbol wasn't computed this tick.
pub(crate) fn get(indicators: &HashMap<Symbol, IndicatorSet>, symbol: &str) -> IndicatorSet {
    indicators.get(symbol).copied().unwrap_or_else(neutral_indicators)
}

/// `stddev(last `window` daily returns) * sqrt(252)`, clamped to a 0.01
/// floor. Falls back to 0.3 when fewer than `window`
/// returns are available — the "insufficient history" sentinel, not an
/// error, since a freshly-listed or thinly-fetched symbol is an expected
/// input, not a failure.
pub fn annualized_volatility(returns: &[Decimal], window: usize) -> Decimal {
    if returns.len() < window || window == 0 {
        return Decimal::new(3, 1); // 0.3
    }
    let sample = &returns[returns.len() - window..];
    let n = Decimal::from(sample.len() as u64);
    let mean = sample.iter().sum::<Decimal>() / n;
    let variance = sample
        .iter()
        .map(|r| {
            let d = *r - mean;
            d * d
        })
        .sum::<Decimal>()
        / n;
    let std = variance.sqrt().unwrap_or(Decimal::ZERO);
    let trading_days = Decimal::from(252u32).sqrt().unwrap_or(Decimal::ZERO);
    let annualized = std * trading_days;
    annualized.max(Decimal::new(1, 2)) // 0.01 floor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn insufficient_history_falls_back_to_point_three() {
        let returns = vec![dec!(0.01), dec!(-0.01)];
        assert_eq!(annualized_volatility(&returns, 90), dec!(0.3));
    }

    #[test]
    fn zero_variance_clamps_to_floor() {
        let returns = vec![Decimal::ZERO; 14];
        assert_eq!(annualized_volatility(&returns, 14), dec!(0.01));
    }

    #[test]
    fn neutral_indicators_read_as_bear_regime() {
        let neutral = neutral_indicators();
        assert!(!neutral.is_bull_regime());
    }
}
