use rust_decimal::Decimal;

/// Rounds `value` down to 6 decimal places: `floor(x * 1e6) / 1e6`.
/// Used for every share quantity the planner and `place_order` compute, so
/// a rebalance step never asks for more shares than its target or more
/// cash than is available.
pub fn floor_6dp(value: Decimal) -> Decimal {
    value.trunc_with_scale(6)
}

/// Rounds `value` to 2 decimal places, half-away-from-zero — the limit
/// price `place_order` submits.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn floor_6dp_truncates_toward_zero() {
        assert_eq!(floor_6dp(dec!(1.1234567)), dec!(1.123456));
        assert_eq!(floor_6dp(dec!(1.1234999)), dec!(1.123499));
    }

    #[test]
    fn floor_6dp_never_rounds_up() {
        // Guards the cash-sufficiency invariant: a naive round()
        // here could push a buy's share count just over what it can afford.
        assert!(floor_6dp(dec!(0.9999999)) < dec!(1));
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(dec!(100.017)), dec!(100.02));
        assert_eq!(round2(dec!(100.014)), dec!(100.01));
    }
}
