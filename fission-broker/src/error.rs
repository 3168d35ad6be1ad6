use thiserror::Error;

/// Result alias for broker gateway operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Failure surfaced by a `BrokerGateway` call. Every operation may fail;
/// callers (the market-data provider, the rebalancing executor) are
/// responsible for treating a failure as "no data"/"no order" rather than
/// propagating it further, except account fetch failures, which abort
/// the tick.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker request failed: {0}")]
    Request(String),
    #[error("broker rejected the request: {0}")]
    Rejected(String),
    #[error("order {0} not found")]
    OrderNotFound(String),
    #[error("rate limit exceeded")]
    RateLimited,
}
