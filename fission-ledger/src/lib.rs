//! Append-only execution logging for the Fission engine: the alert log,
//! the trade-execution log, and the once-per-tick dashboard export. Each
//! is a thin sink trait plus a JSON file-backed default implementation —
//! the core only ever constructs a record and hands it to a sink, it
//! never awaits email/S3/dashboard-UI I/O directly.

mod alert;
mod dashboard;
mod error;
mod execution_log;
mod jsonl;

pub use alert::{AlertRecord, AlertSink, JsonLinesAlertSink};
pub use dashboard::{
    DashboardExport, DashboardSink, FileDashboardSink, PortfolioSnapshot, StrategyDashboardEntry,
};
pub use error::{LedgerError, LedgerResult};
pub use execution_log::{
    ExecutedOrder, ExecutionLogSink, ExecutionSummary, JsonLinesExecutionLogSink,
    TradeExecutionLogEntry,
};
