//! Built-in indicator implementations provided by the crate.

pub mod bollinger;
pub mod ema;
/// Moving Average Convergence Divergence module.
pub mod macd;
pub mod ma_return;
pub mod cum_return;
pub mod rsi;
pub mod sma;

pub use bollinger::{BollingerBands, BollingerBandsOutput};
pub use cum_return::CumReturn;
pub use ema::Ema;
pub use ma_return::MaReturn;
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;
