use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Symbol → weight. Used both as the output of a named-portfolio expansion
/// and as the shape of a `ConsolidatedPortfolio`.
pub type WeightMap = HashMap<Symbol, Decimal>;

/// The final target allocation for a tick: Symbol → weight in `(0, 1]`,
/// with `Σ weights ≤ 1.0 ± 0.05`. Never renormalized — a deviation is
/// logged, not corrected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedPortfolio {
    pub weights: WeightMap,
}

impl ConsolidatedPortfolio {
    pub fn new(weights: WeightMap) -> Self {
        Self { weights }
    }

    /// The documented empty-portfolio fallback: all cash, held as BIL.
    pub fn cash_fallback() -> Self {
        let mut weights = WeightMap::new();
        weights.insert("BIL".to_string(), Decimal::ONE);
        Self { weights }
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> Decimal {
        self.weights.values().sum()
    }

    /// `|Σw − 1|`, the quantity the strategy manager logs a warning
    /// against when it exceeds 0.05. Never used to renormalize.
    pub fn deviation_from_one(&self) -> Decimal {
        (self.total_weight() - Decimal::ONE).abs()
    }
}
