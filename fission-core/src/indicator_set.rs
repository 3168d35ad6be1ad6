use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fallback used whenever an RSI-like series has no usable value yet.
pub const RSI_FALLBACK: f64 = 50.0;
/// Fallback used whenever a return-like series (MAReturn, CumReturn) has no
/// usable value yet.
pub const RETURN_FALLBACK: f64 = 0.0;

/// A per-symbol, per-tick snapshot of every indicator the strategy engines
/// read. Missing inputs have already been resolved to the documented
/// fallback by the time this struct is built — there is no `Option`
/// here on purpose, matching `StrategySignal`'s "indicators snapshot" in
/// the data model, which downstream code reads unconditionally.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi_9: Decimal,
    pub rsi_10: Decimal,
    pub rsi_20: Decimal,
    pub ma_20: Decimal,
    pub ma_200: Decimal,
    pub ma_return_90: Decimal,
    pub cum_return_60: Decimal,
    pub current_price: Decimal,
}

impl IndicatorSet {
    /// True when price has closed above its 200-period moving average —
    /// the bull/bear regime split used throughout C3 and C4.
    pub fn is_bull_regime(&self) -> bool {
        self.current_price > self.ma_200
    }
}
