//! Domain types shared by every crate in the Fission workspace.
//!
//! This crate has no behavior beyond small invariant-preserving
//! constructors. Strategy logic lives in `fission-strategy` and
//! `fission-portfolio`; broker I/O lives in `fission-broker` and its
//! connectors.

mod account;
mod bar;
mod history;
mod indicator_set;
mod order;
mod planned_trade;
mod portfolio;
mod position;
mod quote;
mod signal;
mod symbol;

pub use account::Account;
pub use bar::{closes, Bar, BarSeries};
pub use history::{Interval, Period};
pub use indicator_set::{IndicatorSet, RETURN_FALLBACK, RSI_FALLBACK};
pub use order::{Order, OrderStatus, OrderType, Side, TimeInForce};
pub use planned_trade::PlannedTrade;
pub use portfolio::{ConsolidatedPortfolio, WeightMap};
pub use position::Position;
pub use quote::Quote;
pub use signal::{Action, NamedPortfolio, SignalTarget, StrategySignal};
pub use symbol::Symbol;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_mid_prefers_both_sides() {
        let q = Quote {
            bid: dec!(100.0),
            ask: dec!(101.0),
            last: dec!(100.5),
        };
        assert_eq!(q.mid(), Some(dec!(100.5)));
    }

    #[test]
    fn quote_mid_falls_back_to_positive_side() {
        let q = Quote {
            bid: Decimal::ZERO,
            ask: dec!(101.0),
            last: dec!(100.5),
        };
        assert_eq!(q.mid(), Some(dec!(101.0)));

        let q2 = Quote {
            bid: dec!(99.0),
            ask: Decimal::ZERO,
            last: dec!(100.5),
        };
        assert_eq!(q2.mid(), Some(dec!(99.0)));
    }

    #[test]
    fn quote_mid_undefined_when_neither_side_positive() {
        let q = Quote {
            bid: Decimal::ZERO,
            ask: Decimal::ZERO,
            last: dec!(100.5),
        };
        assert_eq!(q.mid(), None);
    }

    #[test]
    fn consolidated_portfolio_cash_fallback() {
        let p = ConsolidatedPortfolio::cash_fallback();
        assert_eq!(p.weights.get("BIL"), Some(&Decimal::ONE));
        assert!(p.deviation_from_one() < dec!(0.0001));
    }

    #[test]
    fn consolidated_portfolio_deviation_warns_without_renormalizing() {
        let mut weights = WeightMap::new();
        weights.insert("AAA".to_string(), dec!(0.5));
        weights.insert("BBB".to_string(), dec!(0.6));
        let p = ConsolidatedPortfolio::new(weights);
        assert_eq!(p.total_weight(), dec!(1.1));
        assert!(p.deviation_from_one() > dec!(0.05));
    }

    #[test]
    fn order_status_terminality() {
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Filled.is_settled());
        assert!(OrderStatus::Canceled.is_settled());
        assert!(!OrderStatus::PartiallyFilled.is_settled());
    }

    #[test]
    fn side_sign_matches_slippage_direction() {
        assert_eq!(Side::Buy.sign(), 1);
        assert_eq!(Side::Sell.sign(), -1);
    }

    #[test]
    fn indicator_set_regime_split_is_strict() {
        let bull = IndicatorSet {
            rsi_9: dec!(50),
            rsi_10: dec!(50),
            rsi_20: dec!(50),
            ma_20: dec!(100),
            ma_200: dec!(400),
            ma_return_90: dec!(0),
            cum_return_60: dec!(0),
            current_price: dec!(450),
        };
        assert!(bull.is_bull_regime());

        let bear = IndicatorSet {
            current_price: dec!(400),
            ..bull
        };
        assert!(!bear.is_bull_regime());
    }
}
