//! The Nuclear (C3) and TECL (C4) decision-tree strategy engines.
//!
//! Both engines are pure functions of an `IndicatorSet` snapshot (already
//! resolved to its documented fallback per symbol, per `fission-indicators`)
//! plus, for Nuclear's portfolio construction, the raw daily-return history
//! needed to compute realized volatility. Neither engine touches a broker
//! or a cache — that lives in `fission-data` and `fission-portfolio`.

mod util;

/// The Nuclear decision tree, its top-N inverse-volatility
/// portfolio construction, and its bear-market combined strategy.
pub mod nuclear;
/// The TECL decision tree, KMLM switcher, and bond/short filter.
pub mod tecl;

pub use util::annualized_volatility;
