//! C5: the Strategy Manager — runs the Nuclear and TECL
//! engines, expands each signal's target into a concrete weight map,
//! scales by the configured per-strategy capital share, and merges the
//! result into one `ConsolidatedPortfolio`.

mod error;
mod expand;
mod indicators;
mod manager;
mod priced;

pub use error::ManagerError;
pub use expand::expand_signal;
pub use indicators::{build_indicator_set, daily_returns};
pub use manager::{StrategyManager, TickOutcome};
pub use priced::{priced_nuclear_allocation, PricedNuclearEntry};
