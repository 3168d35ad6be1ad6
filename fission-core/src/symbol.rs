/// Ticker symbol. A type alias rather than a newtype so callers can use
/// string literals (`"SPY"`) directly, matching how the rest of the
/// workspace threads symbols through hash maps and match arms.
pub type Symbol = String;
