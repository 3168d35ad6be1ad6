//! Nuclear strategy engine.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fission_core::{Action, IndicatorSet, NamedPortfolio, SignalTarget, StrategySignal, Symbol, WeightMap};

use crate::util::{annualized_volatility, get};

const OVERBOUGHT_PRIMARY: Decimal = Decimal::from_parts(79, 0, 0, false, 0);
const OVERBOUGHT_EXTREME: Decimal = Decimal::from_parts(81, 0, 0, false, 0);
const OVERSOLD: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
const PSQ_OVERSOLD: Decimal = Decimal::from_parts(35, 0, 0, false, 0);
const QQQ_WEAK_CUM_RETURN: Decimal = Decimal::from_parts(10, 0, 0, true, 0);

const SECONDARY_OVERBOUGHT: &[&str] = &["IOO", "TQQQ", "VTV", "XLF"];

/// Default number of nuclear constituents selected when the caller
/// doesn't override `top_n_nuclear`.
pub const DEFAULT_TOP_N: usize = 3;
/// Minimum weight a bear-combined constituent must clear to survive;
/// weights below this are dropped.
const BEAR_MIN_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// One nuclear constituent's allocation: its inverse-volatility weight and
/// the 90-day momentum (`ma_return_90`) that earned it a slot, carried
/// through so `fission-portfolio`'s dashboard sink can show both.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NuclearEntry {
    pub weight: Decimal,
    pub performance: Decimal,
}

/// Evaluates the Nuclear decision tree for one tick. `daily_returns`
/// supplies the close-to-close return history the bull and bear branches
/// need for volatility; it only needs to be populated for symbols a
/// bull/bear branch might actually weight (nuclear + bear universes).
pub fn evaluate(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
    daily_returns: &HashMap<Symbol, Vec<Decimal>>,
    top_n_nuclear: usize,
) -> StrategySignal {
    let signal = |target: SignalTarget, action: Action, reason: String| {
        StrategySignal::new(target, action, reason, indicators.clone(), market_data.clone())
    };

    let spy = get(indicators, "SPY");
    if spy.rsi_10 > OVERBOUGHT_PRIMARY {
        if spy.rsi_10 > OVERBOUGHT_EXTREME {
            return signal(
                SignalTarget::Symbol("UVXY".to_string()),
                Action::Buy,
                "SPY extremely overbought".to_string(),
            );
        }
        for s in SECONDARY_OVERBOUGHT {
            if get(indicators, s).rsi_10 > OVERBOUGHT_EXTREME {
                return signal(
                    SignalTarget::Symbol("UVXY".to_string()),
                    Action::Buy,
                    format!("{s} extremely overbought"),
                );
            }
        }
        return signal(
            SignalTarget::Named(NamedPortfolio::UvxyBtalPortfolio),
            Action::Buy,
            "SPY moderately overbought; 75/25 hedge".to_string(),
        );
    }

    let vox = get(indicators, "VOX");
    if vox.rsi_10 > OVERBOUGHT_PRIMARY {
        let xlf = get(indicators, "XLF");
        if xlf.rsi_10 > OVERBOUGHT_EXTREME {
            return signal(
                SignalTarget::Symbol("UVXY".to_string()),
                Action::Buy,
                "XLF extremely overbought".to_string(),
            );
        }
        return signal(
            SignalTarget::Named(NamedPortfolio::UvxyBtalPortfolio),
            Action::Buy,
            "VOX moderately overbought; 75/25 hedge".to_string(),
        );
    }

    let tqqq = get(indicators, "TQQQ");
    if tqqq.rsi_10 < OVERSOLD {
        return signal(
            SignalTarget::Symbol("TQQQ".to_string()),
            Action::Buy,
            "TQQQ oversold".to_string(),
        );
    }

    if spy.rsi_10 < OVERSOLD {
        return signal(
            SignalTarget::Symbol("UPRO".to_string()),
            Action::Buy,
            "SPY oversold; leveraged dip buy".to_string(),
        );
    }

    if spy.is_bull_regime() {
        let portfolio = nuclear_portfolio(indicators, daily_returns, top_n_nuclear);
        if portfolio.is_empty() {
            signal(
                SignalTarget::Symbol("SMR".to_string()),
                Action::Buy,
                "bull regime; nuclear portfolio empty, fallback to SMR".to_string(),
            )
        } else {
            signal(
                SignalTarget::Named(NamedPortfolio::NuclearPortfolio),
                Action::Buy,
                "bull regime; nuclear inverse-volatility portfolio".to_string(),
            )
        }
    } else {
        bear_combined(indicators, market_data, daily_returns)
    }
}

/// Ranks the nuclear universe by `ma_return_90` descending, takes the
/// top `top_n`, and weights the selection by inverse realized volatility.
/// Symbols with no indicators rank at a 0% momentum tie (equivalent to the
/// documented "pad from remaining nuclear symbols with performance 0").
pub fn nuclear_portfolio(
    indicators: &HashMap<Symbol, IndicatorSet>,
    daily_returns: &HashMap<Symbol, Vec<Decimal>>,
    top_n: usize,
) -> HashMap<Symbol, NuclearEntry> {
    let mut ranked: Vec<(Symbol, Decimal)> = fission_markets::NUCLEAR
        .iter()
        .map(|&s| {
            let performance = indicators.get(s).map(|i| i.ma_return_90).unwrap_or(Decimal::ZERO);
            (s.to_string(), performance)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let selected: Vec<(Symbol, Decimal)> = ranked.into_iter().take(top_n.max(1)).collect();

    let mut inverse_vols: HashMap<Symbol, Decimal> = HashMap::new();
    for (symbol, _) in &selected {
        let empty = Vec::new();
        let returns = daily_returns.get(symbol).unwrap_or(&empty);
        let vol = annualized_volatility(returns, 90);
        inverse_vols.insert(symbol.clone(), Decimal::ONE / vol);
    }
    let total: Decimal = inverse_vols.values().sum();
    if total <= Decimal::ZERO {
        return HashMap::new();
    }

    selected
        .into_iter()
        .map(|(symbol, performance)| {
            let weight = inverse_vols[&symbol] / total;
            (symbol, NuclearEntry { weight, performance })
        })
        .collect()
}

fn bonds_stronger_than_psq(indicators: &HashMap<Symbol, IndicatorSet>) -> bool {
    get(indicators, "TLT").rsi_20 > get(indicators, "PSQ").rsi_20
}

/// Bear-1: the variant with the QQQ-weak clause and the IEF clause.
fn bear1(indicators: &HashMap<Symbol, IndicatorSet>) -> (Symbol, &'static str) {
    let psq = get(indicators, "PSQ");
    if psq.rsi_10 < PSQ_OVERSOLD {
        return ("SQQQ".to_string(), "PSQ oversold");
    }

    let qqq = get(indicators, "QQQ");
    if qqq.cum_return_60 < QQQ_WEAK_CUM_RETURN {
        return if bonds_stronger_than_psq(indicators) {
            ("TQQQ".to_string(), "QQQ weak 60d but bonds strong vs PSQ, contrarian")
        } else {
            ("PSQ".to_string(), "QQQ weak 60d")
        };
    }

    if indicators.contains_key("TQQQ") {
        let tqqq = get(indicators, "TQQQ");
        if tqqq.current_price > tqqq.ma_20 {
            return if bonds_stronger_than_psq(indicators) {
                ("TQQQ".to_string(), "TQQQ above MA20, bonds confirm")
            } else {
                ("SQQQ".to_string(), "TQQQ above MA20, bonds weak")
            };
        }
        let ief = get(indicators, "IEF");
        if ief.rsi_10 > psq.rsi_20 {
            return ("SQQQ".to_string(), "TQQQ below MA20, IEF strong vs PSQ");
        }
        return if bonds_stronger_than_psq(indicators) {
            ("QQQ".to_string(), "TQQQ below MA20, bonds confirm")
        } else {
            ("SQQQ".to_string(), "TQQQ below MA20, bonds weak")
        };
    }

    ("SQQQ".to_string(), "default bearish hedge")
}

/// Bear-2: the variant without the QQQ-weak clause and without
/// the IEF clause.
fn bear2(indicators: &HashMap<Symbol, IndicatorSet>) -> (Symbol, &'static str) {
    let psq = get(indicators, "PSQ");
    if psq.rsi_10 < PSQ_OVERSOLD {
        return ("SQQQ".to_string(), "PSQ oversold");
    }

    if indicators.contains_key("TQQQ") {
        let tqqq = get(indicators, "TQQQ");
        if tqqq.current_price > tqqq.ma_20 {
            return if bonds_stronger_than_psq(indicators) {
                ("TQQQ".to_string(), "TQQQ above MA20, bonds confirm")
            } else {
                ("SQQQ".to_string(), "TQQQ above MA20, bonds weak")
            };
        }
        return if bonds_stronger_than_psq(indicators) {
            ("QQQ".to_string(), "TQQQ below MA20, bonds confirm")
        } else {
            ("SQQQ".to_string(), "TQQQ below MA20, bonds weak")
        };
    }

    ("SQQQ".to_string(), "default bearish hedge")
}

/// Combines Bear-1 and Bear-2: if they agree, emit the single
/// signal. Otherwise attempt the inverse-vol `BEAR_PORTFOLIO` hedge over
/// both symbols; if volatility can't be computed for either leg, fall
/// back to Bear-1's signal.
fn bear_combined(
    indicators: &HashMap<Symbol, IndicatorSet>,
    market_data: &HashMap<Symbol, Decimal>,
    daily_returns: &HashMap<Symbol, Vec<Decimal>>,
) -> StrategySignal {
    let (s1, r1) = bear1(indicators);
    let (s2, _r2) = bear2(indicators);

    if s1 == s2 {
        return StrategySignal::new(
            SignalTarget::Symbol(s1),
            Action::Buy,
            format!("bear regime; {r1}"),
            indicators.clone(),
            market_data.clone(),
        );
    }

    match bear_pair_weights(&s1, &s2, daily_returns) {
        Some(_weights) => StrategySignal::new(
            SignalTarget::Named(NamedPortfolio::BearPortfolio),
            Action::Buy,
            format!("bear regime; {s1}/{s2} diverge, inverse-vol combined hedge"),
            indicators.clone(),
            market_data.clone(),
        ),
        None => StrategySignal::new(
            SignalTarget::Symbol(s1),
            Action::Buy,
            format!("bear regime; {r1} (bear-2 diverged to {s2}, volatility unavailable)"),
            indicators.clone(),
            market_data.clone(),
        ),
    }
}

/// The pure weight-map form of the Bear-1/Bear-2 combination, used by
/// `fission-portfolio`'s named-portfolio expansion rather
/// than re-deriving Bear-1/Bear-2 agreement from the signal alone. Returns
/// `None` when the two sub-strategies agree (caller should use a
/// single-symbol weight of 1.0) is never produced here — callers that
/// already know `s1 == s2` should skip straight to a 100% weight; this
/// function always runs the full combination.
pub fn bear_combined_weights(
    indicators: &HashMap<Symbol, IndicatorSet>,
    daily_returns: &HashMap<Symbol, Vec<Decimal>>,
) -> Option<WeightMap> {
    let (s1, _) = bear1(indicators);
    let (s2, _) = bear2(indicators);
    if s1 == s2 {
        let mut weights = WeightMap::new();
        weights.insert(s1, Decimal::ONE);
        return Some(weights);
    }
    bear_pair_weights(&s1, &s2, daily_returns)
}

fn bear_pair_weights(
    s1: &str,
    s2: &str,
    daily_returns: &HashMap<Symbol, Vec<Decimal>>,
) -> Option<WeightMap> {
    let r1 = daily_returns.get(s1)?;
    let r2 = daily_returns.get(s2)?;
    if r1.is_empty() || r2.is_empty() {
        return None;
    }

    let inv1 = Decimal::ONE / annualized_volatility(r1, 14);
    let inv2 = Decimal::ONE / annualized_volatility(r2, 14);
    let total = inv1 + inv2;
    if total <= Decimal::ZERO {
        return None;
    }

    let mut weights = WeightMap::new();
    let w1 = inv1 / total;
    let w2 = inv2 / total;
    if w1 >= BEAR_MIN_WEIGHT {
        weights.insert(s1.to_string(), w1);
    }
    if w2 >= BEAR_MIN_WEIGHT {
        weights.insert(s2.to_string(), w2);
    }
    if weights.is_empty() {
        None
    } else {
        Some(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn indicators_with(rsi_10_overrides: &[(&str, Decimal)]) -> HashMap<Symbol, IndicatorSet> {
        let mut map = HashMap::new();
        let base = IndicatorSet {
            rsi_9: dec!(50),
            rsi_10: dec!(50),
            rsi_20: dec!(50),
            ma_20: dec!(100),
            ma_200: dec!(400),
            ma_return_90: dec!(0),
            cum_return_60: dec!(0),
            current_price: dec!(450),
        };
        map.insert("SPY".to_string(), base);
        for (symbol, rsi_10) in rsi_10_overrides {
            map.insert(
                symbol.to_string(),
                IndicatorSet { rsi_10: *rsi_10, ..base },
            );
        }
        map
    }

    #[test]
    fn spy_extremely_overbought_buys_uvxy() {
        let indicators = indicators_with(&[("SPY", dec!(85))]);
        let sig = evaluate(&indicators, &HashMap::new(), &HashMap::new(), DEFAULT_TOP_N);
        assert_eq!(sig.target, SignalTarget::Symbol("UVXY".to_string()));
        assert_eq!(sig.action, Action::Buy);
        assert!(sig.reason.contains("SPY extremely overbought"));
    }

    #[test]
    fn spy_rsi_boundary_is_strict() {
        let at_threshold = indicators_with(&[("SPY", dec!(79.0))]);
        let sig = evaluate(&at_threshold, &HashMap::new(), &HashMap::new(), DEFAULT_TOP_N);
        assert_ne!(sig.target, SignalTarget::Symbol("UVXY".to_string()));

        let past_threshold = indicators_with(&[("SPY", dec!(79.1))]);
        let sig = evaluate(&past_threshold, &HashMap::new(), &HashMap::new(), DEFAULT_TOP_N);
        assert_eq!(
            sig.target,
            SignalTarget::Named(NamedPortfolio::UvxyBtalPortfolio)
        );
    }

    #[test]
    fn bull_market_nuclear_portfolio_picks_top_three_equal_weighted() {
        let mut indicators = HashMap::new();
        indicators.insert(
            "SPY".to_string(),
            IndicatorSet {
                rsi_9: dec!(50),
                rsi_10: dec!(55),
                rsi_20: dec!(50),
                ma_20: dec!(440),
                ma_200: dec!(400),
                ma_return_90: dec!(0),
                cum_return_60: dec!(0),
                current_price: dec!(450),
            },
        );
        let perf = [
            ("OKLO", dec!(18)),
            ("BWXT", dec!(15)),
            ("SMR", dec!(12)),
            ("LEU", dec!(8)),
            ("EXC", dec!(6)),
            ("NLR", dec!(10)),
        ];
        for (symbol, ma_return_90) in perf {
            indicators.insert(
                symbol.to_string(),
                IndicatorSet {
                    rsi_9: dec!(50),
                    rsi_10: dec!(50),
                    rsi_20: dec!(50),
                    ma_20: dec!(10),
                    ma_200: dec!(10),
                    ma_return_90,
                    cum_return_60: dec!(0),
                    current_price: dec!(10),
                },
            );
        }
        let sig = evaluate(&indicators, &HashMap::new(), &HashMap::new(), 3);
        assert_eq!(
            sig.target,
            SignalTarget::Named(NamedPortfolio::NuclearPortfolio)
        );

        let portfolio = nuclear_portfolio(&indicators, &HashMap::new(), 3);
        let mut symbols: Vec<&Symbol> = portfolio.keys().collect();
        symbols.sort();
        let mut expected = vec!["BWXT".to_string(), "OKLO".to_string(), "SMR".to_string()];
        expected.sort();
        assert_eq!(symbols, expected.iter().collect::<Vec<_>>());
        for entry in portfolio.values() {
            assert!((entry.weight - dec!(1) / dec!(3)).abs() < dec!(0.0001));
        }
    }

    #[test]
    fn bear_combined_agrees_on_single_symbol() {
        let indicators = indicators_with(&[("PSQ", dec!(50)), ("QQQ", dec!(50))]);
        let sig = bear_combined(&indicators, &HashMap::new(), &HashMap::new());
        // Neither TQQQ nor IEF present: both sub-strategies fall through to SQQQ.
        assert_eq!(sig.target, SignalTarget::Symbol("SQQQ".to_string()));
    }
}
