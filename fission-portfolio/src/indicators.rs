use rust_decimal::Decimal;

use fission_core::IndicatorSet;
use fission_indicators::batch::{cum_return, ma_return, rsi, safe_last, sma, Kind};

/// Builds one symbol's `IndicatorSet` from its close-price series,
/// or `None` if the series is empty — the non-empty-data gate that
/// applies before a symbol's indicators are added to the tick's map.
/// Indicator-construction errors (an invalid window) are swallowed into an
/// empty result and resolved to the documented fallback by `safe_last`.
pub fn build_indicator_set(closes: &[Decimal]) -> Option<IndicatorSet> {
    if closes.is_empty() {
        return None;
    }
    let last_close = closes.last().copied();

    let rsi_9 = safe_last(&series_or_empty(rsi(closes, 9)), Kind::Rsi, None);
    let rsi_10 = safe_last(&series_or_empty(rsi(closes, 10)), Kind::Rsi, None);
    let rsi_20 = safe_last(&series_or_empty(rsi(closes, 20)), Kind::Rsi, None);
    let ma_20 = safe_last(&series_or_empty(sma(closes, 20)), Kind::MovingAverage, last_close);
    let ma_200 = safe_last(&series_or_empty(sma(closes, 200)), Kind::MovingAverage, last_close);
    let ma_return_90 = safe_last(&series_or_empty(ma_return(closes, 90)), Kind::Return, None);
    let cum_return_60 = safe_last(&series_or_empty(cum_return(closes, 60)), Kind::Return, None);

    Some(IndicatorSet {
        rsi_9,
        rsi_10,
        rsi_20,
        ma_20,
        ma_200,
        ma_return_90,
        cum_return_60,
        current_price: last_close.unwrap_or(Decimal::ZERO),
    })
}

fn series_or_empty(
    result: Result<Vec<Option<Decimal>>, fission_indicators::IndicatorError>,
) -> Vec<Option<Decimal>> {
    result.unwrap_or_default()
}

/// Daily close-to-close percentage returns, the raw input Nuclear's
/// volatility calculations annualize. A zero close is
/// treated as an undefined return (0.0) rather than dividing by zero.
pub fn daily_returns(closes: &[Decimal]) -> Vec<Decimal> {
    closes
        .windows(2)
        .map(|pair| {
            if pair[0].is_zero() {
                Decimal::ZERO
            } else {
                (pair[1] / pair[0]) - Decimal::ONE
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_series_yields_no_indicator_set() {
        assert!(build_indicator_set(&[]).is_none());
    }

    #[test]
    fn short_series_falls_back_to_documented_constants() {
        let closes = vec![dec!(100), dec!(101), dec!(99)];
        let set = build_indicator_set(&closes).unwrap();
        assert_eq!(set.rsi_9, dec!(50));
        assert_eq!(set.current_price, dec!(99));
    }

    #[test]
    fn daily_returns_computes_percentage_change() {
        let closes = vec![dec!(100), dec!(110), dec!(99)];
        let returns = daily_returns(&closes);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0], dec!(0.1));
    }
}
