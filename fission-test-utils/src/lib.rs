//! A scripted, in-memory `BrokerGateway` + `MarketDataProvider`
//! (`MockBroker`) so `fission-execution` and `fission-portfolio` can be
//! tested against deterministic broker behavior instead of hand-rolled
//! stubs duplicated per crate.

mod mock_broker;

pub use mock_broker::{FillPolicy, MockBroker};
