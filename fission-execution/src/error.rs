use thiserror::Error;

/// Errors the rebalancing executor surfaces. These are rare: most broker
/// failures degrade to "skip this trade" rather than an `Err`, but an
/// account-fetch failure aborts the tick outright.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to fetch account snapshot: {0}")]
    AccountUnavailable(#[from] fission_broker::BrokerError),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
