//! Rolling mean of percentage returns (MAReturn).

use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::core::{decimal_from_usize, Indicator, IndicatorError};

/// Rolling mean of the first-difference percentage return over a window,
/// expressed in percent (mean × 100).
#[derive(Debug, Clone)]
pub struct MaReturn {
    period: usize,
    divisor: Decimal,
    prev_price: Option<Decimal>,
    window: VecDeque<Decimal>,
    sum: Decimal,
}

impl MaReturn {
    /// Creates a new MAReturn with the provided window.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("MAReturn", period));
        }

        Ok(Self {
            period,
            divisor: decimal_from_usize(period),
            prev_price: None,
            window: VecDeque::with_capacity(period),
            sum: Decimal::ZERO,
        })
    }
}

impl Indicator for MaReturn {
    type Input = Decimal;
    type Output = Decimal;

    fn next(&mut self, input: Self::Input) -> Option<Self::Output> {
        let prev = match self.prev_price {
            Some(prev) => prev,
            None => {
                self.prev_price = Some(input);
                return None;
            }
        };
        self.prev_price = Some(input);

        let ret = if prev.is_zero() {
            Decimal::ZERO
        } else {
            (input - prev) / prev
        };

        self.window.push_back(ret);
        self.sum += ret;

        if self.window.len() > self.period {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }

        if self.window.len() == self.period {
            Some((self.sum / self.divisor) * Decimal::from(100))
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.prev_price = None;
        self.window.clear();
        self.sum = Decimal::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::MaReturn;
    use crate::Indicator;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn waits_for_full_window() {
        let mut ma = MaReturn::new(2).unwrap();
        assert_eq!(ma.next(dec("100")), None); // seeds prev_price
        assert_eq!(ma.next(dec("110")), None); // one return, window not full
        assert!(ma.next(dec("121")).is_some());
    }

    #[test]
    fn constant_percentage_gain_reports_that_percentage() {
        let mut ma = MaReturn::new(2).unwrap();
        ma.next(dec("100"));
        ma.next(dec("110"));
        let out = ma.next(dec("121")).unwrap();
        assert!((out - dec("10")).abs() <= dec("0.0000000001"));
    }
}
