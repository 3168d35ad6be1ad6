//! Binary-facing glue for the Fission trading engine: argument parsing,
//! `tracing-subscriber` bootstrap, and the `run-once` / `run-continuous`
//! commands. Library crates in this workspace only emit `tracing` events;
//! this is the one place a subscriber actually gets installed.

/// `clap` argument parsing and command dispatch.
pub mod cli;
/// Builds an `Engine<AlpacaGateway>` from loaded configuration and
/// environment credentials.
pub mod engine;
/// `tracing-subscriber` installation.
pub mod logging;
/// The continuous-mode tick loop: fixed-interval scheduling with
/// exponential backoff and a consecutive-failure fail-stop.
pub mod run_loop;
