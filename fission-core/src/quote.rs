use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A top-of-book quote. `mid()` encodes the exact fallback ladder the
/// market-data provider uses to derive a current price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
}

impl Quote {
    /// (bid+ask)/2 when both sides are positive, else whichever side is
    /// positive, else `None`.
    pub fn mid(&self) -> Option<Decimal> {
        let bid_ok = self.bid > Decimal::ZERO;
        let ask_ok = self.ask > Decimal::ZERO;
        match (bid_ok, ask_ok) {
            (true, true) => Some((self.bid + self.ask) / Decimal::from(2)),
            (true, false) => Some(self.bid),
            (false, true) => Some(self.ask),
            (false, false) => None,
        }
    }
}
