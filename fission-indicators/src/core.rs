//! Foundational traits shared by every indicator in this crate.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while constructing or driving an indicator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    /// An indicator was constructed with a zero (or otherwise invalid) period.
    #[error("{indicator} requires a non-zero period, got {period}")]
    InvalidPeriod {
        /// Name of the indicator that rejected the period.
        indicator: &'static str,
        /// The rejected period value.
        period: usize,
    },

    /// An indicator was constructed with an out-of-range named parameter
    /// (e.g. a negative Bollinger Bands standard-deviation multiplier).
    #[error("{indicator} rejected parameter {parameter}: {value}")]
    InvalidParameter {
        /// Name of the indicator that rejected the parameter.
        indicator: &'static str,
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// The rejected value, rendered for the error message.
        value: Decimal,
    },
}

impl IndicatorError {
    /// Builds an `InvalidPeriod` error for the named indicator.
    pub fn invalid_period(indicator: &'static str, period: usize) -> Self {
        Self::InvalidPeriod { indicator, period }
    }

    /// Builds an `InvalidParameter` error for the named indicator.
    pub fn invalid_parameter(indicator: &'static str, parameter: &'static str, value: Decimal) -> Self {
        Self::InvalidParameter {
            indicator,
            parameter,
            value,
        }
    }
}

/// Anything an indicator can consume one tick of. Implemented for `Decimal`
/// directly so every close-price-driven indicator (RSI, SMA, MAReturn,
/// CumReturn) can be fed a plain price stream.
pub trait Input {
    /// Extracts the scalar value the indicator operates on.
    fn value(&self) -> Decimal;
}

impl Input for Decimal {
    fn value(&self) -> Decimal {
        *self
    }
}

/// A streaming indicator: feed it one input at a time via `next`, get back
/// `None` until enough history has accumulated, then `Some(value)` on every
/// tick after.
pub trait Indicator {
    /// The type fed into the indicator on each call to `next`.
    type Input;
    /// The type produced once the indicator has enough history.
    type Output;

    /// Feeds one more input into the indicator, returning the new output
    /// once enough history has accumulated.
    fn next(&mut self, input: Self::Input) -> Option<Self::Output>;

    /// Clears all accumulated state, as if the indicator were freshly
    /// constructed.
    fn reset(&mut self);
}

/// Converts a small non-negative count into a `Decimal` divisor, used by
/// every fixed-window indicator to average a running sum.
pub fn decimal_from_usize(value: usize) -> Decimal {
    Decimal::from(value as u64)
}
