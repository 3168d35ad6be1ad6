use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{IndicatorSet, Symbol, WeightMap};

/// The action a `StrategySignal` recommends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// The three symbolic portfolios a strategy can emit instead of a single
/// symbol or an explicit weight map, as a tagged variant with an `expand`
/// method (implemented in `fission-portfolio`, which owns the indicator
/// and universe data needed to actually expand one of these).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedPortfolio {
    NuclearPortfolio,
    BearPortfolio,
    UvxyBtalPortfolio,
}

/// What a strategy decision tree recommends allocating capital to: a single
/// symbol, one of the three named portfolios, or an already-concrete weight
/// map (as produced by inverse-volatility construction).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SignalTarget {
    Symbol(Symbol),
    Named(NamedPortfolio),
    Weights(WeightMap),
}

/// The output of one strategy engine's decision tree for one tick:
/// `{ target, action, reason, indicators snapshot, market_data snapshot }`.
/// `reason` is a human-readable multi-line string (regime + the
/// triggering branch), not a bare branch name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub target: SignalTarget,
    pub action: Action,
    pub reason: String,
    pub indicators: HashMap<Symbol, IndicatorSet>,
    pub market_data: HashMap<Symbol, Decimal>,
}

impl StrategySignal {
    pub fn new(
        target: SignalTarget,
        action: Action,
        reason: impl Into<String>,
        indicators: HashMap<Symbol, IndicatorSet>,
        market_data: HashMap<Symbol, Decimal>,
    ) -> Self {
        Self {
            target,
            action,
            reason: reason.into(),
            indicators,
            market_data,
        }
    }

    /// A `HOLD` signal carrying an evaluation error as its reason — what
    /// the strategy manager records when an engine fails.
    pub fn hold_on_error(reason: impl Into<String>) -> Self {
        Self {
            target: SignalTarget::Symbol("SPY".to_string()),
            action: Action::Hold,
            reason: reason.into(),
            indicators: HashMap::new(),
            market_data: HashMap::new(),
        }
    }
}
