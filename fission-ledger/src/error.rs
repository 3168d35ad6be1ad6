use thiserror::Error;

/// Result alias for ledger sink operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type surfaced by the append-only log sinks. Not fatal to a tick:
/// callers log the error and keep going, since no sink failure should
/// block a rebalance that already executed.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),
}
