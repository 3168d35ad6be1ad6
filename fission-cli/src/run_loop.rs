use std::sync::Arc;
use std::time::Duration;

use fission::Engine;
use fission_alpaca::AlpacaGateway;
use tracing::{error, info, warn};

/// Base backoff after a single failed tick, seconds. Matches the
/// original continuous-mode loop's `60 * 2^min(errors, 5)` formula.
const BASE_BACKOFF_SECS: u64 = 60;
/// Ceiling the backoff never exceeds, seconds (5 minutes).
const MAX_BACKOFF_SECS: u64 = 300;
/// Exponent cap: backoff stops doubling past this many consecutive errors.
const MAX_BACKOFF_EXPONENT: u32 = 5;

/// `min(60 * 2^min(errors, 5), 300)` seconds.
fn backoff(consecutive_errors: u32) -> Duration {
    let exponent = consecutive_errors.min(MAX_BACKOFF_EXPONENT);
    let seconds = BASE_BACKOFF_SECS.saturating_mul(1u64 << exponent).min(MAX_BACKOFF_SECS);
    Duration::from_secs(seconds)
}

/// Runs ticks at a fixed `interval`, backing off exponentially after each
/// failure and bailing out once `max_errors` consecutive ticks have
/// failed. A `Ctrl-C` stops the loop cleanly between ticks.
pub async fn run(engine: Arc<Engine<AlpacaGateway>>, interval: Duration, max_errors: u32) -> anyhow::Result<()> {
    let mut consecutive_errors: u32 = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, stopping continuous run");
                return Ok(());
            }
            result = engine.run_tick() => {
                match result {
                    Ok(report) => {
                        consecutive_errors = 0;
                        info!(
                            submitted = report.outcome.submitted.len(),
                            skipped = report.outcome.skipped.len(),
                            "tick succeeded"
                        );
                        tokio::time::sleep(interval).await;
                    }
                    Err(err) => {
                        consecutive_errors += 1;
                        warn!(%err, consecutive_errors, max_errors, "tick failed");
                        if consecutive_errors >= max_errors {
                            error!(consecutive_errors, "too many consecutive failures, stopping continuous run");
                            anyhow::bail!("stopped after {consecutive_errors} consecutive failed ticks: {err}");
                        }
                        tokio::time::sleep(backoff(consecutive_errors)).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps_at_five_minutes() {
        assert_eq!(backoff(0), Duration::from_secs(60));
        assert_eq!(backoff(1), Duration::from_secs(120));
        assert_eq!(backoff(2), Duration::from_secs(240));
        assert_eq!(backoff(5), Duration::from_secs(300));
        assert_eq!(backoff(9), Duration::from_secs(300));
    }
}
