use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single closed OHLCV bar. Indicators only ever consume the close column;
/// the rest is carried for completeness and for future-proofing connectors
/// that want high/low/volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Canonical input to the indicator engine: a closed-bar series, oldest
/// first. Empty on fetch failure — see `fission-data`.
pub type BarSeries = Vec<Bar>;

/// Pulls the close column out of a bar series, the only column the
/// indicator engine reads.
pub fn closes(series: &[Bar]) -> Vec<Decimal> {
    series.iter().map(|b| b.close).collect()
}
