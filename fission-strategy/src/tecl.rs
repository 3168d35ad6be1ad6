//! TECL strategy engine.

use std::collections::HashMap;

use rust_decimal::Decimal;

use fission_core::{Action, IndicatorSet, SignalTarget, StrategySignal, Symbol, WeightMap};

use crate::util::get;

const BULL_TQQQ_OVERBOUGHT: Decimal = Decimal::from_parts(79, 0, 0, false, 0);
const BULL_SPY_OVERBOUGHT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
const BEAR_TQQQ_OVERSOLD: Decimal = Decimal::from_parts(31, 0, 0, false, 0);
const BEAR_SPXL_OVERSOLD: Decimal = Decimal::from_parts(29, 0, 0, false, 0);
const BEAR_UVXY_EXTREME: Decimal = Decimal::from_parts(84, 0, 0, false, 0);
const BEAR_UVXY_ELEVATED: Decimal = Decimal::from_parts(74, 0, 0, false, 0);
const KMLM_XLK_EXTREME: Decimal = Decimal::from_parts(81, 0, 0, false, 0);
const KMLM_XLK_OVERSOLD: Decimal = Decimal::from_parts(29, 0, 0, false, 0);

/// Evaluates the TECL decision tree for one tick.
pub fn evaluate(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
) -> StrategySignal {
    let spy = get(indicators, "SPY");
    if spy.is_bull_regime() {
        bull_path(indicators, market_data)
    } else {
        bear_path(indicators, market_data)
    }
}

fn bull_path(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
) -> StrategySignal {
    let tqqq = get(indicators, "TQQQ");
    if tqqq.rsi_10 > BULL_TQQQ_OVERBOUGHT {
        return weights_signal(
            hedge_weights(),
            "TQQQ extremely overbought; light hedge".to_string(),
            indicators,
            market_data,
        );
    }

    let spy = get(indicators, "SPY");
    if spy.rsi_10 > BULL_SPY_OVERBOUGHT {
        return weights_signal(
            hedge_weights(),
            "SPY extremely overbought; light hedge".to_string(),
            indicators,
            market_data,
        );
    }

    kmlm_switcher(indicators, market_data, true)
}

fn bear_path(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
) -> StrategySignal {
    let tqqq = get(indicators, "TQQQ");
    if tqqq.rsi_10 < BEAR_TQQQ_OVERSOLD {
        return symbol_signal(
            "TECL",
            "TQQQ oversold; leveraged long".to_string(),
            indicators,
            market_data,
        );
    }

    let spxl = get(indicators, "SPXL");
    if spxl.rsi_10 < BEAR_SPXL_OVERSOLD {
        return symbol_signal("SPXL", "SPXL oversold".to_string(), indicators, market_data);
    }

    let uvxy = get(indicators, "UVXY");
    if uvxy.rsi_10 > BEAR_UVXY_EXTREME {
        let mut weights = WeightMap::new();
        weights.insert("UVXY".to_string(), Decimal::new(15, 2));
        weights.insert("BIL".to_string(), Decimal::new(85, 2));
        return weights_signal(
            weights,
            "UVXY extremely overbought; light hedge".to_string(),
            indicators,
            market_data,
        );
    }
    if uvxy.rsi_10 > BEAR_UVXY_ELEVATED {
        return symbol_signal("BIL", "UVXY overbought; move to cash".to_string(), indicators, market_data);
    }

    kmlm_switcher(indicators, market_data, false)
}

fn hedge_weights() -> WeightMap {
    let mut weights = WeightMap::new();
    weights.insert("UVXY".to_string(), Decimal::new(25, 2));
    weights.insert("BIL".to_string(), Decimal::new(75, 2));
    weights
}

/// The KMLM switcher. `bull` selects which regime's
/// KMLM-leads fallback applies (BIL in bull regime, bond/short filter in
/// bear regime).
fn kmlm_switcher(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
    bull: bool,
) -> StrategySignal {
    if !indicators.contains_key("XLK") || !indicators.contains_key("KMLM") {
        return symbol_signal("BIL", "missing data".to_string(), indicators, market_data);
    }

    let xlk = get(indicators, "XLK");
    let kmlm = get(indicators, "KMLM");

    if xlk.rsi_10 > kmlm.rsi_10 {
        return if xlk.rsi_10 > KMLM_XLK_EXTREME {
            symbol_signal("BIL", "XLK extremely overbought vs KMLM".to_string(), indicators, market_data)
        } else {
            symbol_signal("TECL", "XLK leading KMLM".to_string(), indicators, market_data)
        };
    }

    if xlk.rsi_10 < KMLM_XLK_OVERSOLD {
        return symbol_signal("TECL", "XLK oversold".to_string(), indicators, market_data);
    }

    if bull {
        symbol_signal("BIL", "KMLM leading in bull regime; move to cash".to_string(), indicators, market_data)
    } else {
        bond_short_filter(indicators, market_data)
    }
}

/// Bond/short filter: among {SQQQ, BSV}, by RSI(9), pick the higher.
fn bond_short_filter(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
) -> StrategySignal {
    match (indicators.get("SQQQ"), indicators.get("BSV")) {
        (Some(sqqq), Some(bsv)) => {
            if sqqq.rsi_9 >= bsv.rsi_9 {
                symbol_signal("SQQQ", "bond/short filter; SQQQ RSI9 leads BSV".to_string(), indicators, market_data)
            } else {
                symbol_signal("BSV", "bond/short filter; BSV RSI9 leads SQQQ".to_string(), indicators, market_data)
            }
        }
        (Some(_), None) => {
            symbol_signal("SQQQ", "bond/short filter; BSV unavailable".to_string(), indicators, market_data)
        }
        (None, Some(_)) => {
            symbol_signal("BSV", "bond/short filter; SQQQ unavailable".to_string(), indicators, market_data)
        }
        (None, None) => {
            symbol_signal("BIL", "bond/short filter; neither SQQQ nor BSV available".to_string(), indicators, market_data)
        }
    }
}

fn symbol_signal(
    symbol: &str,
    reason: String,
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
) -> StrategySignal {
    StrategySignal::new(
        SignalTarget::Symbol(symbol.to_string()),
        Action::Buy,
        reason,
        indicators.clone(),
        market_data.clone(),
    )
}

fn weights_signal(
    weights: WeightMap,
    reason: String,
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
) -> StrategySignal {
    StrategySignal::new(
        SignalTarget::Weights(weights),
        Action::Buy,
        reason,
        indicators.clone(),
        market_data.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base(rsi_10: Decimal, current_price: Decimal, ma_200: Decimal) -> IndicatorSet {
        IndicatorSet {
            rsi_9: dec!(50),
            rsi_10,
            rsi_20: dec!(50),
            ma_20: dec!(50),
            ma_200,
            ma_return_90: dec!(0),
            cum_return_60: dec!(0),
            current_price,
        }
    }

    #[test]
    fn bull_tqqq_overbought_hedges() {
        let mut indicators = HashMap::new();
        indicators.insert("SPY".to_string(), base(dec!(50), dec!(450), dec!(400)));
        indicators.insert("TQQQ".to_string(), base(dec!(82), dec!(50), dec!(50)));

        let sig = evaluate(&indicators, &HashMap::new());
        match sig.target {
            SignalTarget::Weights(ref w) => {
                assert_eq!(w.get("UVXY"), Some(&dec!(0.25)));
                assert_eq!(w.get("BIL"), Some(&dec!(0.75)));
            }
            other => panic!("expected a weight map, got {other:?}"),
        }
    }

    #[test]
    fn bear_bond_short_filter_picks_higher_rsi9() {
        let mut indicators = HashMap::new();
        indicators.insert("SPY".to_string(), base(dec!(50), dec!(390), dec!(400)));
        indicators.insert("TQQQ".to_string(), base(dec!(40), dec!(50), dec!(50)));
        indicators.insert("SPXL".to_string(), base(dec!(40), dec!(50), dec!(50)));
        indicators.insert("UVXY".to_string(), base(dec!(50), dec!(50), dec!(50)));
        indicators.insert("XLK".to_string(), base(dec!(45), dec!(50), dec!(50)));
        indicators.insert("KMLM".to_string(), base(dec!(55), dec!(50), dec!(50)));
        indicators.insert(
            "SQQQ".to_string(),
            IndicatorSet { rsi_9: dec!(65), ..base(dec!(50), dec!(50), dec!(50)) },
        );
        indicators.insert(
            "BSV".to_string(),
            IndicatorSet { rsi_9: dec!(45), ..base(dec!(50), dec!(50), dec!(50)) },
        );

        let sig = evaluate(&indicators, &HashMap::new());
        assert_eq!(sig.target, SignalTarget::Symbol("SQQQ".to_string()));
    }

    #[test]
    fn missing_xlk_or_kmlm_falls_back_to_bil() {
        let mut indicators = HashMap::new();
        indicators.insert("SPY".to_string(), base(dec!(50), dec!(450), dec!(400)));
        indicators.insert("TQQQ".to_string(), base(dec!(50), dec!(50), dec!(50)));

        let sig = evaluate(&indicators, &HashMap::new());
        assert_eq!(sig.target, SignalTarget::Symbol("BIL".to_string()));
        assert_eq!(sig.reason, "missing data");
    }
}
