//! Whole-series indicator evaluation and the `safe_last` fallback helper.
//!
//! Every strategy engine in this workspace evaluates indicators over an
//! entire cached bar series each tick rather than feeding one bar at a
//! time, unlike the streaming [`crate::Indicator`] trait the primitives
//! here are built on. These functions replay the streaming implementation
//! over the whole series and collect its outputs, so the recurrence itself
//! is defined exactly once.

use rust_decimal::Decimal;

use crate::core::Indicator;
use crate::indicators::{CumReturn, MaReturn, Rsi, Sma};

/// Wilder-style RSI over a close-price series. `None` while there isn't
/// enough history yet.
pub fn rsi(series: &[Decimal], window: usize) -> Result<Vec<Option<Decimal>>, crate::IndicatorError> {
    let mut indicator = Rsi::new(window)?;
    Ok(series.iter().map(|&value| indicator.next(value)).collect())
}

/// Simple moving average over a close-price series.
pub fn sma(series: &[Decimal], window: usize) -> Result<Vec<Option<Decimal>>, crate::IndicatorError> {
    let mut indicator = Sma::new(window)?;
    Ok(series.iter().map(|&value| indicator.next(value)).collect())
}

/// Rolling mean of percentage returns, in percent.
pub fn ma_return(series: &[Decimal], window: usize) -> Result<Vec<Option<Decimal>>, crate::IndicatorError> {
    let mut indicator = MaReturn::new(window)?;
    Ok(series.iter().map(|&value| indicator.next(value)).collect())
}

/// Cumulative percentage return over a fixed lag.
pub fn cum_return(series: &[Decimal], window: usize) -> Result<Vec<Option<Decimal>>, crate::IndicatorError> {
    let mut indicator = CumReturn::new(window)?;
    Ok(series.iter().map(|&value| indicator.next(value)).collect())
}

/// The documented fallback family an indicator result belongs to.
/// Each variant carries what `safe_last` needs to compute its fallback.
pub enum Kind {
    /// RSI-like: falls back to 50.0.
    Rsi,
    /// MA-like: falls back to the last close if available, else 50.0.
    MovingAverage,
    /// Return-like (MAReturn, CumReturn): falls back to 0.0.
    Return,
}

/// Returns the last non-`None` value in `result`; if there is none, returns
/// the documented fallback constant for `kind`. `last_close` is the most
/// recent close price, used only by [`Kind::MovingAverage`]'s fallback.
///
/// Mirrors `core/indicators.py`'s per-function `except` clause: any
/// indicator failure is swallowed here and replaced by the fallback, never
/// propagated to the caller.
pub fn safe_last(result: &[Option<Decimal>], kind: Kind, last_close: Option<Decimal>) -> Decimal {
    if let Some(value) = result.iter().rev().find_map(|v| *v) {
        return value;
    }

    match kind {
        Kind::Rsi => Decimal::from(50),
        Kind::MovingAverage => last_close.unwrap_or(Decimal::from(50)),
        Kind::Return => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn rsi_batch_matches_streaming_output() {
        let series: Vec<Decimal> = ["1", "2", "3", "2", "1"].iter().map(|s| dec(s)).collect();
        let out = rsi(&series, 3).unwrap();
        assert_eq!(out.len(), series.len());
        assert!(out[0].is_none());
        assert!(out[3].is_some());
    }

    #[test]
    fn safe_last_falls_back_when_series_too_short() {
        let out = vec![None, None];
        assert_eq!(safe_last(&out, Kind::Rsi, None), dec("50"));
        assert_eq!(safe_last(&out, Kind::Return, None), dec("0"));
        assert_eq!(safe_last(&out, Kind::MovingAverage, Some(dec("123.45"))), dec("123.45"));
        assert_eq!(safe_last(&out, Kind::MovingAverage, None), dec("50"));
    }

    #[test]
    fn safe_last_returns_most_recent_non_none_value() {
        let out = vec![Some(dec("10")), None];
        assert_eq!(safe_last(&out, Kind::Rsi, None), dec("10"));
    }
}
