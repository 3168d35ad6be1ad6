use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fission_core::{Action, Symbol};

use crate::error::LedgerResult;
use crate::jsonl::JsonLinesWriter;

/// One line of the append-only alert log: `{timestamp, symbol,
/// action, price, reason}`, written whenever a strategy signal's action is
/// not HOLD so operators have a human-readable trail of what fired and why.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: Symbol,
    pub action: Action,
    pub price: Decimal,
    pub reason: String,
}

/// Sink an alert factory writes through. Kept as a trait so an email/SMS
/// notifier can be swapped in behind this call without touching the
/// strategy manager.
pub trait AlertSink: Send + Sync {
    fn record(&self, alert: &AlertRecord) -> LedgerResult<()>;
}

/// Default `AlertSink`: appends one JSON line per alert to a file.
pub struct JsonLinesAlertSink {
    writer: JsonLinesWriter,
}

impl JsonLinesAlertSink {
    pub fn open(path: impl AsRef<std::path::Path>) -> LedgerResult<Self> {
        Ok(Self {
            writer: JsonLinesWriter::open(path)?,
        })
    }
}

impl AlertSink for JsonLinesAlertSink {
    fn record(&self, alert: &AlertRecord) -> LedgerResult<()> {
        self.writer.append_line(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn writes_one_json_object_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.jsonl");
        let sink = JsonLinesAlertSink::open(&path).unwrap();

        sink.record(&AlertRecord {
            timestamp: Utc::now(),
            symbol: "UVXY".to_string(),
            action: Action::Buy,
            price: dec!(12.34),
            reason: "SPY extremely overbought".to_string(),
        })
        .unwrap();
        sink.record(&AlertRecord {
            timestamp: Utc::now(),
            symbol: "SPY".to_string(),
            action: Action::Hold,
            price: dec!(450.0),
            reason: "no clear signal".to_string(),
        })
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(serde_json::from_str::<AlertRecord>(line).is_ok());
        }
    }
}
