//! Symbol universe tables for the Nuclear and TECL strategy engines.
//!
//! These are plain string-slice constants, not configuration: the
//! universes are fixed parts of each engine's decision tree, so there is
//! no runtime knob here, only names the engines
//! and the strategy manager (`fission-portfolio`) fetch history for.

/// Nuclear's broad-market basket, checked for the primary/secondary
/// overbought branches.
pub const MARKET: &[&str] = &["SPY", "IOO", "TQQQ", "VTV", "XLF", "VOX"];

/// Volatility hedges used by the UVXY/BTAL named portfolio.
pub const VOLATILITY: &[&str] = &["UVXY", "BTAL"];

/// Tech/leverage symbols referenced by Nuclear's bear-combined strategy.
pub const TECH: &[&str] = &["QQQ", "SQQQ", "PSQ", "UPRO"];

/// Bond symbols used as the "bonds stronger than PSQ" contrarian signal.
pub const BONDS: &[&str] = &["TLT", "IEF"];

/// The nuclear-energy constituents ranked by 90-day momentum for the
/// inverse-volatility portfolio.
pub const NUCLEAR: &[&str] = &["SMR", "BWXT", "LEU", "EXC", "NLR", "OKLO"];

/// TECL's universe: bull/bear leveraged ETFs, the KMLM switcher's pair,
/// and the bond/short filter's candidates.
pub const TECL_UNIVERSE: &[&str] = &[
    "SPY", "TQQQ", "SPXL", "TECL", "XLK", "KMLM", "UVXY", "BIL", "BSV", "SQQQ",
];

/// Every symbol the Nuclear decision tree, its portfolio construction, and
/// its bear-combined strategy can reference.
pub fn nuclear_universe() -> Vec<&'static str> {
    let mut symbols: Vec<&'static str> = Vec::new();
    symbols.extend_from_slice(MARKET);
    symbols.extend_from_slice(VOLATILITY);
    symbols.extend_from_slice(TECH);
    symbols.extend_from_slice(BONDS);
    symbols.extend_from_slice(NUCLEAR);
    symbols
}

/// Every symbol the TECL decision tree can reference.
pub fn tecl_universe() -> Vec<&'static str> {
    TECL_UNIVERSE.to_vec()
}

/// The union of both engines' universes — what the strategy manager
/// fetches history for each tick.
pub fn combined_universe() -> Vec<&'static str> {
    let mut symbols = nuclear_universe();
    for sym in tecl_universe() {
        if !symbols.contains(&sym) {
            symbols.push(sym);
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_universe_has_no_duplicates() {
        let combined = combined_universe();
        let mut seen = std::collections::HashSet::new();
        for sym in &combined {
            assert!(seen.insert(*sym), "duplicate symbol {sym}");
        }
    }

    #[test]
    fn nuclear_universe_contains_all_six_constituents() {
        let universe = nuclear_universe();
        for sym in NUCLEAR {
            assert!(universe.contains(sym));
        }
    }
}
