//! The `BrokerGateway` trait and the rate limiter every concrete
//! connector (`connectors/fission-alpaca`, and `fission-test-utils`'s
//! mock) is built against.

mod error;
mod gateway;
/// `governor`-backed direct and keyed rate limiters: Alpaca enforces a
/// per-minute request cap per account, the same shape most brokerage and
/// exchange connectors guard against.
pub mod limiter;

pub use error::{BrokerError, BrokerResult};
pub use gateway::BrokerGateway;
pub use limiter::{RateLimiter, RateLimiterError};
