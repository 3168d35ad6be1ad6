use rust_decimal::Decimal;
use thiserror::Error;

/// Fatal construction-time error.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("strategy allocations must sum to 1.0 within 0.01, got {0}")]
    AllocationsDoNotSumToOne(Decimal),
}
