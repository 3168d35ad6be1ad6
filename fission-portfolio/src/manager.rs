use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use fission_core::{closes, ConsolidatedPortfolio, IndicatorSet, Interval, Period, StrategySignal, Symbol};
use fission_data::{MarketDataProvider, DEFAULT_PERIOD};
use fission_strategy::{nuclear, tecl};

use crate::error::ManagerError;
use crate::expand::expand_signal;
use crate::indicators::{build_indicator_set, daily_returns};

/// Allowed drift between `alpha_nuclear + alpha_tecl` and `1.0`.
const ALPHA_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01
/// Deviation from a fully-allocated consolidated portfolio that's logged
/// but never corrected.
const DEVIATION_WARN_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 2); // 0.05

/// What one tick of the strategy manager produced: the consolidated target
/// plus both engines' raw signals, so a caller can log or persist the
/// reasoning that led to the target.
#[derive(Clone, Debug)]
pub struct TickOutcome {
    pub target: ConsolidatedPortfolio,
    pub nuclear_signal: StrategySignal,
    pub tecl_signal: StrategySignal,
}

/// C5: the Strategy Manager. Fetches history for the
/// combined universe, builds each symbol's indicators, runs both decision
/// trees, expands and scales their targets, and merges the result into one
/// consolidated portfolio.
pub struct StrategyManager<P: MarketDataProvider> {
    provider: Arc<P>,
    alpha_nuclear: Decimal,
    alpha_tecl: Decimal,
    top_n_nuclear: usize,
}

impl<P: MarketDataProvider> StrategyManager<P> {
    /// Fails fast if the per-strategy capital shares don't sum to `1.0`
    /// within `ALPHA_TOLERANCE` — a fatal configuration error that must
    /// surface before any tick runs.
    pub fn new(
        provider: Arc<P>,
        alpha_nuclear: Decimal,
        alpha_tecl: Decimal,
        top_n_nuclear: usize,
    ) -> Result<Self, ManagerError> {
        let total = alpha_nuclear + alpha_tecl;
        if (total - Decimal::ONE).abs() > ALPHA_TOLERANCE {
            return Err(ManagerError::AllocationsDoNotSumToOne(total));
        }
        Ok(Self {
            provider,
            alpha_nuclear,
            alpha_tecl,
            top_n_nuclear,
        })
    }

    /// Runs one full tick: fetch history, build indicators, evaluate both
    /// strategies, expand and scale their targets, merge into one
    /// consolidated portfolio.
    pub async fn run_tick(&self) -> TickOutcome {
        let universe = fission_markets::combined_universe();
        let period = Period::new(DEFAULT_PERIOD);

        let mut indicators: HashMap<Symbol, IndicatorSet> = HashMap::new();
        let mut market_data: HashMap<Symbol, Decimal> = HashMap::new();
        let mut returns: HashMap<Symbol, Vec<Decimal>> = HashMap::new();

        for symbol in universe {
            let symbol = symbol.to_string();
            let series = self.provider.history(&symbol, &period, Interval::Daily).await;
            let series_closes = closes(&series);
            if series_closes.is_empty() {
                continue;
            }
            if let Some(set) = build_indicator_set(&series_closes) {
                market_data.insert(symbol.clone(), set.current_price);
                returns.insert(symbol.clone(), daily_returns(&series_closes));
                indicators.insert(symbol, set);
            }
        }

        let nuclear_signal = nuclear::evaluate(&indicators, &market_data, &returns, self.top_n_nuclear);
        let tecl_signal = tecl::evaluate(&indicators, &market_data);

        let nuclear_weights = expand_signal(&nuclear_signal.target, &indicators, &returns, self.top_n_nuclear);
        let tecl_weights = expand_signal(&tecl_signal.target, &indicators, &returns, self.top_n_nuclear);

        let mut merged = HashMap::new();
        for (symbol, weight) in nuclear_weights {
            *merged.entry(symbol).or_insert(Decimal::ZERO) += weight * self.alpha_nuclear;
        }
        for (symbol, weight) in tecl_weights {
            *merged.entry(symbol).or_insert(Decimal::ZERO) += weight * self.alpha_tecl;
        }

        let target = if merged.is_empty() {
            ConsolidatedPortfolio::cash_fallback()
        } else {
            ConsolidatedPortfolio::new(merged)
        };

        if target.deviation_from_one() > DEVIATION_WARN_THRESHOLD {
            warn!(
                deviation = %target.deviation_from_one(),
                total_weight = %target.total_weight(),
                "consolidated portfolio weights deviate from 1.0 by more than 5%"
            );
        }

        TickOutcome {
            target,
            nuclear_signal,
            tecl_signal,
        }
    }
}
