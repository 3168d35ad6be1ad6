//! Typed engine configuration, loaded from a layered TOML
//! file + environment overlay via the `config` crate, the way the rest of
//! the workspace's connectors and binaries expect their settings wired in.
//!
//! Credentials (broker API keys, mail/S3 secrets) are out of scope here —
//! the core only ever reads them as opaque environment strings at the
//! point a connector needs them.

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use fission_core::Symbol;

/// Tolerance within which `strategy_allocations` must sum to `1.0`.
const ALLOCATION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Errors loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A fatal configuration error: construction fails before any tick runs.
    #[error("strategy_allocations must sum to 1.0 within 0.01, got {0}")]
    AllocationsDoNotSumToOne(Decimal),
}

/// The settings the core consumes every tick. Loaded once at startup
/// and passed down by reference; nothing in the engine re-reads the
/// filesystem or environment mid-run.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    /// StrategyType name ("nuclear", "tecl") → capital share. Must sum to
    /// `1.0 ± 0.01`.
    pub strategy_allocations: HashMap<String, Decimal>,

    /// Data cache TTL in seconds.
    #[serde(default = "default_cache_duration_secs")]
    pub cache_duration_secs: u64,

    /// Number of nuclear constituents selected by top-N inverse-volatility
    /// construction. Default 3.
    #[serde(default = "default_top_n_nuclear")]
    pub top_n_nuclear: usize,

    /// Limit-price widening step applied on each `PlaceOrder` retry.
    /// Default 0.3 basis points.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: Decimal,

    /// Per-attempt broker poll timeout, seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Delay between settlement polls, seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Ceiling on total settlement-wait time, seconds.
    #[serde(default = "default_max_wait_time_secs")]
    pub max_wait_time_secs: u64,

    /// Maximum `PlaceOrder` retries before falling back to a market order.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// When true, the executor submits orders even while the market clock
    /// reports closed.
    #[serde(default)]
    pub ignore_market_hours: bool,

    /// Selects the paper or live broker endpoint.
    #[serde(default = "default_paper_trading")]
    pub paper_trading: bool,

    /// Continuous-mode tick cadence, minutes.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Continuous-mode consecutive-failure fail-stop threshold.
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,
}

fn default_cache_duration_secs() -> u64 {
    900
}

fn default_top_n_nuclear() -> usize {
    3
}

fn default_slippage_bps() -> Decimal {
    Decimal::new(3, 1) // 0.3
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_wait_time_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_paper_trading() -> bool {
    true
}

fn default_interval_minutes() -> u64 {
    15
}

fn default_max_errors() -> u32 {
    5
}

impl EngineConfig {
    /// Loads configuration layered `defaults.toml` (if present) < the file
    /// at `path` < environment variables prefixed `FISSION_` (double
    /// underscore as the nesting separator, e.g. `FISSION_TOP_N_NUCLEAR`),
    /// then validates it.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FISSION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let parsed: EngineConfig = raw.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Re-checks the fatal invariant before any tick runs: the
    /// per-strategy capital shares must sum to `1.0 ± 0.01`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total: Decimal = self.strategy_allocations.values().copied().sum();
        if (total - Decimal::ONE).abs() > ALLOCATION_TOLERANCE {
            return Err(ConfigError::AllocationsDoNotSumToOne(total));
        }
        Ok(())
    }

    /// `strategy_allocations["nuclear"]`, or `0` if unset.
    pub fn alpha_nuclear(&self) -> Decimal {
        self.strategy_allocations
            .get("nuclear")
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// `strategy_allocations["tecl"]`, or `0` if unset.
    pub fn alpha_tecl(&self) -> Decimal {
        self.strategy_allocations
            .get("tecl")
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait_time(&self) -> Duration {
        Duration::from_secs(self.max_wait_time_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// Credentials read as opaque strings from the environment at the point a
/// connector needs them — never parsed, never validated by the core.
pub fn broker_credential(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// A symbol's allocation share parsed from a `StrategyType → Decimal` map,
/// for callers that key allocations by `Symbol` rather than strategy name
/// (kept separate from `EngineConfig` so strategy keys and tradable
/// symbols are never confused).
pub fn lookup_allocation(allocations: &HashMap<Symbol, Decimal>, symbol: &str) -> Decimal {
    allocations.get(symbol).copied().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config_with(nuclear: Decimal, tecl: Decimal) -> EngineConfig {
        let mut strategy_allocations = HashMap::new();
        strategy_allocations.insert("nuclear".to_string(), nuclear);
        strategy_allocations.insert("tecl".to_string(), tecl);
        EngineConfig {
            strategy_allocations,
            cache_duration_secs: default_cache_duration_secs(),
            top_n_nuclear: default_top_n_nuclear(),
            slippage_bps: default_slippage_bps(),
            poll_timeout_secs: default_poll_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_time_secs: default_max_wait_time_secs(),
            max_retries: default_max_retries(),
            ignore_market_hours: false,
            paper_trading: default_paper_trading(),
            interval_minutes: default_interval_minutes(),
            max_errors: default_max_errors(),
        }
    }

    #[test]
    fn validate_accepts_allocations_summing_to_one() {
        let cfg = config_with(dec!(0.6), dec!(0.4));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_allocations_off_by_more_than_tolerance() {
        let cfg = config_with(dec!(0.5), dec!(0.3));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_allocations_within_tolerance() {
        let cfg = config_with(dec!(0.601), dec!(0.4));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn alpha_accessors_read_named_shares() {
        let cfg = config_with(dec!(0.6), dec!(0.4));
        assert_eq!(cfg.alpha_nuclear(), dec!(0.6));
        assert_eq!(cfg.alpha_tecl(), dec!(0.4));
    }

    #[test]
    fn durations_convert_from_seconds_fields() {
        let cfg = config_with(dec!(0.6), dec!(0.4));
        assert_eq!(cfg.cache_duration(), Duration::from_secs(900));
        assert_eq!(cfg.interval(), Duration::from_secs(900));
    }
}
