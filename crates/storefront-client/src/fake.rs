//! In-memory backend for unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use storefront_core::{Address, CartRecord, Money, Product};
use tokio::time::Instant;

use crate::backend::{LoginResponse, StorefrontBackend};
use crate::error::{ClientError, ClientResult};

#[derive(Default)]
pub(crate) struct FakeState {
    pub catalog: Vec<Product>,
    pub cart: Vec<CartRecord>,
    pub addresses: Vec<Address>,
    pub balance: Money,
    pub users: HashMap<String, String>,

    /// Every search call with the (tokio) time it arrived.
    pub search_calls: Vec<(Instant, String)>,
    /// Artificial latency per query text.
    pub search_delays: HashMap<String, Duration>,
    pub fail_search: bool,

    pub cart_posts: Vec<CartRecord>,
    pub checkouts: Vec<String>,
    next_address_id: u32,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

pub(crate) fn product(id: &str, name: &str, cost: i64) -> Product {
    Product::new(id, name, "Sports", Money::new(cost), 4, "")
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Vec<Product>) -> Self {
        let backend = Self::new();
        backend.state().catalog = catalog;
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn search_calls(&self) -> Vec<(Instant, String)> {
        self.state().search_calls.clone()
    }

    fn authorize(&self, token: &str) -> ClientResult<()> {
        let known = token
            .strip_prefix("token-")
            .map(|user| self.state().users.contains_key(user))
            .unwrap_or(false);
        if known {
            Ok(())
        } else {
            Err(ClientError::Api {
                status: 401,
                message: "Protected route, Oauth2 Bearer token not found".into(),
            })
        }
    }

    fn bad_request(message: &str) -> ClientError {
        ClientError::Api {
            status: 400,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl StorefrontBackend for FakeBackend {
    async fn fetch_catalog(&self) -> ClientResult<Vec<Product>> {
        Ok(self.state().catalog.clone())
    }

    async fn search_catalog(&self, query: &str) -> ClientResult<Vec<Product>> {
        let (delay, fail) = {
            let mut state = self.state();
            state.search_calls.push((Instant::now(), query.to_string()));
            (state.search_delays.get(query).copied(), state.fail_search)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(ClientError::Request("connection refused".into()));
        }

        let needle = query.to_lowercase();
        Ok(self
            .state()
            .catalog
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_cart_records(&self, token: &str) -> ClientResult<Vec<CartRecord>> {
        self.authorize(token)?;
        Ok(self.state().cart.clone())
    }

    async fn update_cart(
        &self,
        token: &str,
        product_id: &str,
        quantity: i64,
    ) -> ClientResult<Vec<CartRecord>> {
        self.authorize(token)?;
        let mut state = self.state();
        if !state.catalog.iter().any(|p| p.id == product_id) {
            return Err(Self::bad_request("Product doesn't exist"));
        }
        state.cart_posts.push(CartRecord::new(product_id, quantity));

        let existing = state.cart.iter().position(|r| r.product_id == product_id);
        match (existing, quantity) {
            (Some(i), 0) => {
                state.cart.remove(i);
            }
            (Some(i), q) => state.cart[i].quantity = q,
            (None, 0) => {}
            (None, q) => state.cart.push(CartRecord::new(product_id, q)),
        }
        Ok(state.cart.clone())
    }

    async fn submit_checkout(&self, token: &str, address_id: &str) -> ClientResult<()> {
        self.authorize(token)?;
        let mut state = self.state();
        if !state.addresses.iter().any(|a| a.id == address_id) {
            return Err(Self::bad_request("Address not set"));
        }
        state.checkouts.push(address_id.to_string());
        state.cart.clear();
        Ok(())
    }

    async fn fetch_addresses(&self, token: &str) -> ClientResult<Vec<Address>> {
        self.authorize(token)?;
        Ok(self.state().addresses.clone())
    }

    async fn add_address(&self, token: &str, text: &str) -> ClientResult<Vec<Address>> {
        self.authorize(token)?;
        let mut state = self.state();
        state.next_address_id += 1;
        let id = format!("addr-{}", state.next_address_id);
        state.addresses.push(Address::new(id, text));
        Ok(state.addresses.clone())
    }

    async fn delete_address(&self, token: &str, address_id: &str) -> ClientResult<Vec<Address>> {
        self.authorize(token)?;
        let mut state = self.state();
        state.addresses.retain(|a| a.id != address_id);
        Ok(state.addresses.clone())
    }

    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let state = self.state();
        match state.users.get(username) {
            Some(stored) if stored == password => Ok(LoginResponse {
                token: format!("token-{}", username),
                username: username.to_string(),
                balance: state.balance,
            }),
            Some(_) => Err(Self::bad_request("Password is incorrect")),
            None => Err(Self::bad_request("Username does not exist")),
        }
    }

    async fn register(&self, username: &str, password: &str) -> ClientResult<()> {
        let mut state = self.state();
        if state.users.contains_key(username) {
            return Err(Self::bad_request("Username is already taken"));
        }
        state.users.insert(username.to_string(), password.to_string());
        Ok(())
    }
}
