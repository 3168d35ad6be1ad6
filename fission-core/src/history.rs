use serde::{Deserialize, Serialize};

/// A lookback window expressed the way the broker's bars endpoint expects
/// it — `"1y"`, `"1mo"`, `"1d"` — rather than a parsed duration, since
/// the provider forwards it to the broker verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period(pub String);

impl Period {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bar interval; daily by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Daily,
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interval::Daily => write!(f, "1d"),
        }
    }
}
