//! Cumulative return over a fixed lag (CumReturn).

use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::core::{Indicator, IndicatorError};

/// `(series / series.shift(window) − 1) × 100`.
#[derive(Debug, Clone)]
pub struct CumReturn {
    window: usize,
    history: VecDeque<Decimal>,
}

impl CumReturn {
    /// Creates a new CumReturn with the provided lag window.
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        if window == 0 {
            return Err(IndicatorError::invalid_period("CumReturn", window));
        }

        Ok(Self {
            window,
            history: VecDeque::with_capacity(window + 1),
        })
    }
}

impl Indicator for CumReturn {
    type Input = Decimal;
    type Output = Decimal;

    fn next(&mut self, input: Self::Input) -> Option<Self::Output> {
        self.history.push_back(input);
        if self.history.len() > self.window + 1 {
            self.history.pop_front();
        }

        if self.history.len() == self.window + 1 {
            let oldest = *self.history.front().expect("len checked above");
            if oldest.is_zero() {
                return Some(Decimal::ZERO);
            }
            Some((input / oldest - Decimal::ONE) * Decimal::from(100))
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::CumReturn;
    use crate::Indicator;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn waits_for_lagged_value() {
        let mut cr = CumReturn::new(2).unwrap();
        assert_eq!(cr.next(dec("100")), None);
        assert_eq!(cr.next(dec("110")), None);
        assert!(cr.next(dec("121")).is_some());
    }

    #[test]
    fn reports_percentage_change_over_lag() {
        let mut cr = CumReturn::new(2).unwrap();
        cr.next(dec("100"));
        cr.next(dec("105"));
        let out = cr.next(dec("121")).unwrap();
        assert!((out - dec("21")).abs() <= dec("0.0000000001"));
    }
}
