use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fission_core::{Position, Symbol};

use crate::error::LedgerResult;
use crate::execution_log::ExecutedOrder;

/// One strategy's contribution to the dashboard export — what it signaled,
/// on what symbol, why, and how much of the consolidated portfolio it was
/// allocated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyDashboardEntry {
    pub signal: String,
    pub symbol: Symbol,
    pub reason: String,
    pub allocation: Decimal,
}

/// Portfolio-level figures shown on the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_value: Decimal,
    pub cash: Decimal,
    pub equity: Decimal,
    pub daily_pl: Decimal,
    pub daily_pl_percent: Decimal,
}

/// The dashboard export written once per tick: newest overwrites the
/// previous file at the configured URI rather than appending, since the
/// dashboard only ever needs the latest tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardExport {
    pub timestamp: Option<DateTime<Utc>>,
    pub execution_mode: String,
    pub success: bool,
    pub strategies: HashMap<String, StrategyDashboardEntry>,
    pub portfolio: PortfolioSnapshot,
    pub positions: Vec<Position>,
    pub recent_trades: Vec<ExecutedOrder>,
    pub signals: HashMap<String, serde_json::Value>,
}

impl DashboardExport {
    pub fn new(execution_mode: impl Into<String>, success: bool) -> Self {
        Self {
            timestamp: Some(Utc::now()),
            execution_mode: execution_mode.into(),
            success,
            ..Default::default()
        }
    }
}

/// Sink a tick's dashboard export is written through. Deliberately not
/// `AlertSink`/`ExecutionLogSink`'s append-only shape: the dashboard is a
/// point-in-time snapshot, so "newest wins" per the implementation, not
/// "newest appended".
pub trait DashboardSink: Send + Sync {
    fn publish(&self, export: &DashboardExport) -> LedgerResult<()>;
}

/// Default `DashboardSink`: overwrites a single JSON file at `path` with
/// the latest export.
pub struct FileDashboardSink {
    path: PathBuf,
}

impl FileDashboardSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DashboardSink for FileDashboardSink {
    fn publish(&self, export: &DashboardExport) -> LedgerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_vec_pretty(export)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn publish_overwrites_previous_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        let sink = FileDashboardSink::new(&path);

        let mut first = DashboardExport::new("live", true);
        first.portfolio.total_value = rust_decimal::Decimal::from(100);
        sink.publish(&first).unwrap();

        let mut second = DashboardExport::new("live", true);
        second.portfolio.total_value = rust_decimal::Decimal::from(200);
        sink.publish(&second).unwrap();

        let on_disk: DashboardExport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.portfolio.total_value, rust_decimal::Decimal::from(200));
    }
}
