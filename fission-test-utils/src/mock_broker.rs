use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use fission_broker::{BrokerError, BrokerGateway, BrokerResult};
use fission_core::{
    Account, BarSeries, Interval, Order, OrderStatus, OrderType, Period, Position, Quote, Side,
    Symbol, TimeInForce,
};
use fission_data::MarketDataProvider;

/// How a submitted limit order resolves when polled. Market orders always
/// fill immediately in the mock — only limit orders are scriptable, since
/// the executor's retry/widen/fallback behavior is what its tests need
/// to drive deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillPolicy {
    Immediate,
    Never,
}

struct State {
    market_open: bool,
    account: Account,
    account_fails: bool,
    positions: HashMap<Symbol, Position>,
    prices: HashMap<Symbol, Decimal>,
    histories: HashMap<Symbol, BarSeries>,
    orders: HashMap<String, Order>,
    next_id: u64,
    fill_policy: FillPolicy,
    limit_orders_submitted: usize,
    market_orders_submitted: usize,
    cancellations: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            market_open: true,
            account: Account {
                portfolio_value: Decimal::from(100_000),
                cash: Decimal::from(100_000),
                buying_power: Decimal::from(100_000),
                day_trade_count: 0,
                status: "ACTIVE".to_string(),
            },
            account_fails: false,
            positions: HashMap::new(),
            prices: HashMap::new(),
            histories: HashMap::new(),
            orders: HashMap::new(),
            next_id: 1,
            fill_policy: FillPolicy::Immediate,
            limit_orders_submitted: 0,
            market_orders_submitted: 0,
            cancellations: 0,
        }
    }
}

/// A scripted broker: every operation reads from (and a handful of
/// builder methods write into) a shared, mutex-guarded state, so the same
/// handle can be cloned and passed as both the `BrokerGateway` and the
/// `MarketDataProvider` an executor under test needs.
#[derive(Clone)]
pub struct MockBroker(Arc<Mutex<State>>);

impl MockBroker {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(State::default())))
    }

    pub fn with_market_open(self, open: bool) -> Self {
        self.0.lock().market_open = open;
        self
    }

    pub fn with_account(self, portfolio_value: Decimal, cash: Decimal) -> Self {
        let mut state = self.0.lock();
        state.account.portfolio_value = portfolio_value;
        state.account.cash = cash;
        state.account.buying_power = cash;
        drop(state);
        self
    }

    pub fn failing_account(self) -> Self {
        self.0.lock().account_fails = true;
        self
    }

    /// Registers `symbol`'s current price, used both as the
    /// `MarketDataProvider::current_price` answer and as the mid the
    /// mock's `latest_quote` reports.
    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        self.0.lock().prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_history(self, symbol: &str, series: BarSeries) -> Self {
        self.0.lock().histories.insert(symbol.to_string(), series);
        self
    }

    pub fn with_position(self, symbol: &str, qty: Decimal, price: Decimal) -> Self {
        let position = Position {
            symbol: symbol.to_string(),
            qty,
            market_value: qty * price,
            cost_basis: qty * price,
            current_price: price,
            unrealized_pl: Decimal::ZERO,
        };
        self.0.lock().positions.insert(symbol.to_string(), position);
        self
    }

    pub fn fills_limit_orders_immediately(self) -> Self {
        self.0.lock().fill_policy = FillPolicy::Immediate;
        self
    }

    pub fn never_fills_limit_orders(self) -> Self {
        self.0.lock().fill_policy = FillPolicy::Never;
        self
    }

    pub fn submitted_market_orders(&self) -> usize {
        self.0.lock().market_orders_submitted
    }

    pub fn submitted_limit_orders(&self) -> usize {
        self.0.lock().limit_orders_submitted
    }

    pub fn cancellations(&self) -> usize {
        self.0.lock().cancellations
    }

    pub fn order_exists(&self, order_id: &str) -> bool {
        self.0.lock().orders.contains_key(order_id)
    }

    /// Directly inserts a settled-per-`fill_policy` order without going
    /// through `place_order`'s retry protocol — used by settlement-wait
    /// tests, which only care about polling a pre-existing order id.
    pub fn submit_limit_for_test(&self, symbol: &str, qty: Decimal, side: Side, price: Decimal) -> String {
        let mut state = self.0.lock();
        let status = match state.fill_policy {
            FillPolicy::Immediate => OrderStatus::Filled,
            FillPolicy::Never => OrderStatus::Submitted,
        };
        let id = format!("mock-{}", state.next_id);
        state.next_id += 1;
        state.orders.insert(
            id.clone(),
            Order {
                symbol: symbol.to_string(),
                side,
                qty,
                order_type: OrderType::Limit,
                limit_price: Some(price),
                time_in_force: TimeInForce::Day,
                broker_order_id: id.clone(),
                status,
            },
        );
        id
    }

    /// Simulates settlement for a filled order: moves cash and adjusts the
    /// position book. Real brokers settle asynchronously; the mock does it
    /// synchronously at fill time so executor tests can assert on
    /// refreshed account/position state after a settlement wait.
    fn apply_fill(&self, symbol: &str, side: Side, qty: Decimal, price: Decimal) {
        let mut state = self.0.lock();
        match side {
            Side::Buy => {
                state.account.cash -= qty * price;
                let entry = state.positions.entry(symbol.to_string()).or_insert(Position {
                    symbol: symbol.to_string(),
                    qty: Decimal::ZERO,
                    market_value: Decimal::ZERO,
                    cost_basis: Decimal::ZERO,
                    current_price: price,
                    unrealized_pl: Decimal::ZERO,
                });
                entry.qty += qty;
                entry.cost_basis += qty * price;
                entry.current_price = price;
                entry.market_value = entry.qty * price;
            }
            Side::Sell => {
                state.account.cash += qty * price;
                if let Some(entry) = state.positions.get_mut(symbol) {
                    entry.qty -= qty;
                    entry.current_price = price;
                    entry.market_value = entry.qty * price;
                    if entry.qty <= Decimal::ZERO {
                        state.positions.remove(symbol);
                    }
                }
            }
        }
    }

    fn allocate_order(&self, symbol: &str, qty: Decimal, side: Side, order_type: OrderType, limit_price: Option<Decimal>, status: OrderStatus) -> String {
        let mut state = self.0.lock();
        let id = format!("mock-{}", state.next_id);
        state.next_id += 1;
        state.orders.insert(
            id.clone(),
            Order {
                symbol: symbol.to_string(),
                side,
                qty,
                order_type,
                limit_price,
                time_in_force: TimeInForce::Day,
                broker_order_id: id.clone(),
                status,
            },
        );
        id
    }
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerGateway for MockBroker {
    async fn account(&self) -> BrokerResult<Account> {
        let state = self.0.lock();
        if state.account_fails {
            return Err(BrokerError::Request("account snapshot unavailable".to_string()));
        }
        Ok(state.account.clone())
    }

    async fn positions(&self) -> BrokerResult<HashMap<Symbol, Position>> {
        Ok(self.0.lock().positions.clone())
    }

    async fn is_market_open(&self) -> BrokerResult<bool> {
        Ok(self.0.lock().market_open)
    }

    async fn history(&self, symbol: &str, _period: &Period, _interval: Interval) -> BrokerResult<BarSeries> {
        Ok(self.0.lock().histories.get(symbol).cloned().unwrap_or_default())
    }

    async fn latest_quote(&self, symbol: &str) -> BrokerResult<Quote> {
        let price = self.0.lock().prices.get(symbol).copied().unwrap_or(Decimal::ZERO);
        Ok(Quote {
            bid: price,
            ask: price,
            last: price,
        })
    }

    async fn submit_limit(
        &self,
        symbol: &str,
        qty: Decimal,
        side: Side,
        limit_price: Decimal,
        _tif: TimeInForce,
    ) -> BrokerResult<String> {
        let status = {
            let mut state = self.0.lock();
            state.limit_orders_submitted += 1;
            state.fill_policy
        };
        let order_status = match status {
            FillPolicy::Immediate => OrderStatus::Filled,
            FillPolicy::Never => OrderStatus::Submitted,
        };
        if order_status == OrderStatus::Filled {
            self.apply_fill(symbol, side, qty, limit_price);
        }
        Ok(self.allocate_order(symbol, qty, side, OrderType::Limit, Some(limit_price), order_status))
    }

    async fn submit_market(&self, symbol: &str, qty: Decimal, side: Side, _tif: TimeInForce) -> BrokerResult<String> {
        self.0.lock().market_orders_submitted += 1;
        let price = self.0.lock().prices.get(symbol).copied().unwrap_or(Decimal::ZERO);
        if price > Decimal::ZERO {
            self.apply_fill(symbol, side, qty, price);
        }
        Ok(self.allocate_order(symbol, qty, side, OrderType::Market, None, OrderStatus::Filled))
    }

    async fn get_order(&self, order_id: &str) -> BrokerResult<Order> {
        self.0
            .lock()
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.to_string()))
    }

    async fn cancel_order(&self, order_id: &str) -> BrokerResult<()> {
        let mut state = self.0.lock();
        if let Some(order) = state.orders.get_mut(order_id) {
            order.status = OrderStatus::Canceled;
            state.cancellations += 1;
            Ok(())
        } else {
            Err(BrokerError::OrderNotFound(order_id.to_string()))
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockBroker {
    async fn history(&self, symbol: &Symbol, _period: &Period, _interval: Interval) -> BarSeries {
        self.0.lock().histories.get(symbol).cloned().unwrap_or_default()
    }

    async fn current_price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.0.lock().prices.get(symbol).copied().filter(|price| *price > Decimal::ZERO)
    }
}
